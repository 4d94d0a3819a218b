use serde::{Deserialize, Serialize};

use super::damage;
use super::entities::{Enchantment, Monster};
use super::items::Item;
use super::rng::CombatRng;
use super::state::{Actor, CombatOutcome, CombatState, Difficulty, LogCategory};

const REWARD_DIE: u32 = 20;
const TABLE_DIE: u32 = 6;

/// 战斗结束后交给宿主的奖励描述。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reward {
    pub gold: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
    #[serde(default)]
    pub heal: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RewardEntry {
    Gold { amount: u32 },
    Item { item: Item },
    Heal { amount: u32 },
    RollTierTwo,
}

pub fn secondary_entry(roll: u32) -> RewardEntry {
    match roll {
        1 => RewardEntry::Gold { amount: 15 },
        2 => RewardEntry::Item {
            item: Item::HealthPotion,
        },
        3 => RewardEntry::Item {
            item: Item::SmokeBomb,
        },
        4 => RewardEntry::Heal { amount: 5 },
        5 => RewardEntry::Item {
            item: Item::BlockingScroll,
        },
        _ => RewardEntry::RollTierTwo,
    }
}

pub fn tier_two_entry(roll: u32) -> RewardEntry {
    match roll {
        1 | 2 => RewardEntry::Gold { amount: 40 },
        3 | 4 => RewardEntry::Item {
            item: Item::GreaterPotion,
        },
        5 => RewardEntry::Item {
            item: Item::EnchantScroll {
                enchantment: Enchantment::Keen,
            },
        },
        _ => RewardEntry::Gold { amount: 60 },
    }
}

/// 有倍率时取 `max(min_gold, d20 × 倍率)`，否则固定为 `min_gold`。
pub fn base_gold<R: CombatRng>(monster: &Monster, rng: &mut R) -> u32 {
    match monster.gold_multiplier {
        Some(multiplier) => monster
            .min_gold
            .max(rng.roll_die(REWARD_DIE) * multiplier),
        None => monster.min_gold,
    }
}

fn secondary_reward<R: CombatRng>(rng: &mut R) -> RewardEntry {
    match secondary_entry(rng.roll_die(TABLE_DIE)) {
        RewardEntry::RollTierTwo => tier_two_entry(rng.roll_die(TABLE_DIE)),
        entry => entry,
    }
}

pub fn victory_reward<R: CombatRng>(
    monster: &Monster,
    difficulty: Difficulty,
    pending_gold: u32,
    rng: &mut R,
) -> Reward {
    let mut reward = Reward {
        gold: difficulty.scale_gold(base_gold(monster, rng)) + pending_gold,
        ..Reward::default()
    };
    if difficulty.rolls_secondary_reward() {
        match secondary_reward(rng) {
            RewardEntry::Gold { amount } => reward.gold += amount,
            RewardEntry::Item { item } => reward.items.push(item),
            RewardEntry::Heal { amount } => reward.heal += amount,
            RewardEntry::RollTierTwo => {}
        }
    }
    reward
}

/// 终局结算：胜利时计算奖励并立即治疗，随后所有附属牌回到弃牌堆。
pub fn conclude<R: CombatRng>(state: &mut CombatState, rng: &mut R) {
    match state.outcome() {
        Some(CombatOutcome::Victory) => {
            let reward =
                victory_reward(&state.monster, state.difficulty, state.pending_gold, rng);
            state.pending_gold = 0;
            state.record(
                LogCategory::Reward,
                format!(
                    "The party earns {} gold{}",
                    reward.gold,
                    if reward.items.is_empty() {
                        String::new()
                    } else {
                        let names: Vec<String> = reward.items.iter().map(Item::label).collect();
                        format!(" and {}", names.join(", "))
                    }
                ),
            );
            if reward.heal > 0 {
                for index in state.living_heroes() {
                    damage::restore(state, Actor::Hero { index }, reward.heal);
                }
            }
            state.reward = Some(reward);
        }
        Some(CombatOutcome::Defeat) => {
            state.record(LogCategory::Reward, "No reward for a fallen party");
        }
        None => {
            log::warn!("conclude called on an unfinished combat");
            return;
        }
    }

    let mut returned = std::mem::take(&mut state.monster.attached_cards);
    for hero in &mut state.party {
        returned.append(&mut hero.attached_cards);
    }
    for card in returned {
        state.piles.discard(card);
    }
}
