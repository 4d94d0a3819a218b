//! 战斗随机源：洗牌与掷骰都通过该 trait 注入，便于测试与回放。

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub trait CombatRng {
    /// 返回 `[0, bound)` 内的值；`bound == 0` 时返回 0。
    fn below(&mut self, bound: u32) -> u32;

    fn roll_die(&mut self, sides: u32) -> u32 {
        self.below(sides.max(1)) + 1
    }

    fn choose_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.below(len as u32) as usize
    }

    /// Fisher–Yates 洗牌。
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i as u32 + 1) as usize;
            items.swap(i, j);
        }
    }
}

/// 基于 `SmallRng` 的可复现随机源。
#[derive(Debug, Clone)]
pub struct SeededRng {
    inner: SmallRng,
}

impl SeededRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: SmallRng::from_entropy(),
        }
    }
}

impl CombatRng for SeededRng {
    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.inner.gen_range(0..bound)
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }
}

/// 按预先记录的结果回放掷骰与目标选择，洗牌保持原顺序。
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    rolls: VecDeque<u32>,
    picks: VecDeque<usize>,
}

impl ScriptedRng {
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            picks: VecDeque::new(),
        }
    }

    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks = picks.into_iter().collect();
        self
    }

    pub fn remaining_rolls(&self) -> usize {
        self.rolls.len()
    }
}

impl CombatRng for ScriptedRng {
    fn below(&mut self, _bound: u32) -> u32 {
        0
    }

    // an exhausted script keeps rolling 1s
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.rolls.pop_front().unwrap_or(1).clamp(1, sides.max(1))
    }

    fn choose_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.picks.pop_front().unwrap_or(0) % len
    }

    fn shuffle<T>(&mut self, _items: &mut [T]) {}
}
