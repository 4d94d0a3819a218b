use serde::{Deserialize, Serialize};

use super::cards::{Card, Piles};
use super::entities::{Hero, Monster, StatusEffect, StatusKind, StatusTarget, Vitals};
use super::environment::EnvironmentCard;
use super::error::IntegrityError;
use super::rewards::Reward;

/// 战斗阶段。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CombatPhase {
    Setup,
    ChooseTurnOrder,
    MonsterFlip,
    MonsterRoll,
    HeroFlip,
    HeroRoll,
    Victory,
    Defeat,
}

impl CombatPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, CombatPhase::Victory | CombatPhase::Defeat)
    }
}

impl Default for CombatPhase {
    fn default() -> Self {
        Self::Setup
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TurnDirection {
    /// 按下标降序行动。
    Left,
    /// 按下标升序行动。
    Right,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type")]
pub enum Actor {
    Monster,
    Hero { index: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<TurnDirection>,
    pub actor: Actor,
    pub round: u32,
}

impl Default for TurnState {
    fn default() -> Self {
        Self {
            direction: None,
            actor: Actor::Monster,
            round: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Difficulty {
    Normal,
    Elite,
    Boss,
}

impl Difficulty {
    /// 金币倍率：普通 ×1，精英 ×1.5（向下取整），首领 ×2。
    pub fn scale_gold(self, gold: u32) -> u32 {
        match self {
            Difficulty::Normal => gold,
            Difficulty::Elite => gold * 3 / 2,
            Difficulty::Boss => gold * 2,
        }
    }

    pub fn rolls_secondary_reward(self) -> bool {
        !matches!(self, Difficulty::Normal)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Normal
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LogCategory {
    Setup,
    Environment,
    Turn,
    Flip,
    Match,
    Ability,
    Special,
    Blocked,
    Roll,
    Damage,
    Heal,
    Dodge,
    Status,
    Marker,
    Redeal,
    Item,
    Reward,
    Outcome,
}

/// 战斗日志条目。`timestamp` 是日志内的逻辑时钟。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub text: String,
    pub category: LogCategory,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CombatOutcome {
    Victory,
    Defeat,
}

/// 一场战斗的完整状态。引擎每一步都返回新的副本。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CombatState {
    pub phase: CombatPhase,
    #[serde(default)]
    pub turn: TurnState,
    pub party: Vec<Hero>,
    pub monster: Monster,
    #[serde(default)]
    pub piles: Piles,
    #[serde(default)]
    pub environment_pile: Vec<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<EnvironmentCard>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<StatusEffect>,
    #[serde(default)]
    pub log: Vec<LogEntry>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub pending_gold: u32,
    #[serde(default)]
    pub step: u64,
    pub card_total: usize,
    pub environment_total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<Reward>,
}

impl CombatState {
    pub fn new(
        party: Vec<Hero>,
        monster: Monster,
        piles: Piles,
        environment_pile: Vec<Card>,
        difficulty: Difficulty,
    ) -> Self {
        let mut state = Self {
            phase: CombatPhase::Setup,
            turn: TurnState::default(),
            party,
            monster,
            piles,
            environment_total: environment_pile.len(),
            environment_pile,
            environment: None,
            statuses: Vec::new(),
            log: Vec::new(),
            difficulty,
            pending_gold: 0,
            step: 0,
            card_total: 0,
            reward: None,
        };
        state.card_total = state.cards_in_play();
        state
    }

    pub fn with_phase(mut self, phase: CombatPhase) -> Self {
        self.phase = phase;
        self
    }

    pub fn record(&mut self, category: LogCategory, text: impl Into<String>) {
        let text = text.into();
        log::debug!("[{category:?}] {text}");
        self.log.push(LogEntry {
            text,
            category,
            timestamp: self.log.len() as u64,
        });
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn outcome(&self) -> Option<CombatOutcome> {
        match self.phase {
            CombatPhase::Victory => Some(CombatOutcome::Victory),
            CombatPhase::Defeat => Some(CombatOutcome::Defeat),
            _ => None,
        }
    }

    pub fn living_heroes(&self) -> Vec<usize> {
        self.party
            .iter()
            .enumerate()
            .filter(|(_, hero)| !hero.is_fallen())
            .map(|(index, _)| index)
            .collect()
    }

    /// 当前回合顺序下的存活英雄。每次推进时重新计算，倒下的英雄被跳过。
    pub fn turn_order(&self) -> Vec<usize> {
        let mut order = self.living_heroes();
        if self.turn.direction == Some(TurnDirection::Left) {
            order.reverse();
        }
        order
    }

    /// `current` 之后的下一位存活英雄；`None` 表示从头开始。
    pub fn next_hero_after(&self, current: Option<usize>) -> Option<usize> {
        let order = self.turn_order();
        match (current, self.turn.direction) {
            (None, _) => order.first().copied(),
            (Some(current), Some(TurnDirection::Left)) => {
                order.into_iter().find(|index| *index < current)
            }
            (Some(current), _) => order.into_iter().find(|index| *index > current),
        }
    }

    pub fn actor_name(&self, actor: Actor) -> String {
        match actor {
            Actor::Monster => self.monster.name.clone(),
            Actor::Hero { index } => self
                .party
                .get(index)
                .map(|hero| hero.name.clone())
                .unwrap_or_else(|| format!("hero #{index}")),
        }
    }

    pub fn vitals(&self, actor: Actor) -> Option<&dyn Vitals> {
        match actor {
            Actor::Monster => Some(&self.monster as &dyn Vitals),
            Actor::Hero { index } => self.party.get(index).map(|hero| hero as &dyn Vitals),
        }
    }

    /// 不存在的行动者也视为倒下。
    pub fn is_actor_fallen(&self, actor: Actor) -> bool {
        self.vitals(actor).map_or(true, |entity| entity.is_fallen())
    }

    pub fn vitals_mut(&mut self, actor: Actor) -> Option<&mut dyn Vitals> {
        match actor {
            Actor::Monster => Some(&mut self.monster as &mut dyn Vitals),
            Actor::Hero { index } => self
                .party
                .get_mut(index)
                .map(|hero| hero as &mut dyn Vitals),
        }
    }

    pub fn attached_len(&self, actor: Actor) -> usize {
        self.vitals(actor)
            .map(|entity| entity.attached().len())
            .unwrap_or(0)
    }

    pub fn attach(&mut self, actor: Actor, card: Card) {
        match self.vitals_mut(actor) {
            Some(entity) => entity.attach_card(card),
            None => self.piles.discard(card),
        }
    }

    /// 横置最多 `count` 张未横置的附属牌，返回被横置的牌。
    pub fn tap_attached(&mut self, actor: Actor, count: usize) -> Vec<Card> {
        let Some(entity) = self.vitals_mut(actor) else {
            return Vec::new();
        };
        let mut tapped = Vec::new();
        for card in entity.attached_mut().iter_mut().filter(|card| !card.tapped) {
            if tapped.len() >= count {
                break;
            }
            card.tapped = true;
            tapped.push(card.clone());
        }
        tapped
    }

    pub fn status_total(&self, kind: StatusKind, target: StatusTarget) -> i32 {
        self.statuses
            .iter()
            .filter(|status| status.kind == kind && status.target == target)
            .map(|status| status.payload)
            .sum()
    }

    pub fn has_status(&self, kind: StatusKind, target: StatusTarget) -> bool {
        self.statuses
            .iter()
            .any(|status| status.kind == kind && status.target == target)
    }

    /// 移除并返回一条匹配的状态。
    pub fn take_status(&mut self, kind: StatusKind, target: StatusTarget) -> Option<StatusEffect> {
        let position = self
            .statuses
            .iter()
            .position(|status| status.kind == kind && status.target == target)?;
        Some(self.statuses.remove(position))
    }

    /// 回合边界：剩余回合数减一，到 0 的状态被移除；永久状态保留。
    pub fn tick_statuses(&mut self) -> Vec<StatusEffect> {
        let mut expired = Vec::new();
        for status in &mut self.statuses {
            if status.duration > 0 {
                status.duration -= 1;
            }
        }
        self.statuses.retain(|status| {
            if status.duration == 0 {
                expired.push(status.clone());
                false
            } else {
                true
            }
        });
        expired
    }

    /// 每次伤害结算后的终局检查。
    pub fn check_terminal(&mut self) -> Option<CombatOutcome> {
        if self.is_finished() {
            return self.outcome();
        }
        if self.monster.is_fallen() {
            self.phase = CombatPhase::Victory;
            let name = self.monster.name.clone();
            self.record(LogCategory::Outcome, format!("{name} is defeated"));
        } else if self.party.iter().all(|hero| hero.is_fallen()) {
            self.phase = CombatPhase::Defeat;
            self.record(LogCategory::Outcome, "The party has fallen");
        }
        self.outcome()
    }

    fn cards_in_play(&self) -> usize {
        let hero_cards: usize = self
            .party
            .iter()
            .map(|hero| hero.attached_cards.len() + 1)
            .sum();
        self.piles.len() + hero_cards + self.monster.attached_cards.len()
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        for (index, hero) in self.party.iter().enumerate() {
            if hero.health > hero.max_health {
                return Err(IntegrityError::HeroHealthOutOfBounds {
                    index,
                    health: hero.health,
                    max_health: hero.max_health,
                });
            }
            if hero.roll_effects.is_empty() {
                return Err(IntegrityError::MalformedRollTable {
                    owner: hero.name.clone(),
                    len: 0,
                });
            }
        }

        if self.monster.health > self.monster.max_health {
            return Err(IntegrityError::MonsterHealthOutOfBounds {
                health: self.monster.health,
                max_health: self.monster.max_health,
            });
        }
        if self.monster.roll_effects.is_empty() {
            return Err(IntegrityError::MalformedRollTable {
                owner: self.monster.name.clone(),
                len: 0,
            });
        }

        if let Actor::Hero { index } = self.turn.actor {
            if index >= self.party.len() {
                return Err(IntegrityError::ActorOutOfRange { index });
            }
        }

        let actual = self.cards_in_play();
        if actual != self.card_total {
            return Err(IntegrityError::CardCountMismatch {
                expected: self.card_total,
                actual,
            });
        }

        if self.environment_pile.len() != self.environment_total {
            return Err(IntegrityError::EnvironmentCountMismatch {
                expected: self.environment_total,
                actual: self.environment_pile.len(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::cards::{Rank, Suit};
    use crate::game::testing::sample_state;

    #[test]
    fn right_runs_ascending_and_left_descending() {
        let mut state = sample_state();
        state.turn.direction = Some(TurnDirection::Right);
        assert_eq!(state.turn_order(), vec![0, 1, 2]);
        assert_eq!(state.next_hero_after(Some(0)), Some(1));
        assert_eq!(state.next_hero_after(Some(2)), None);

        state.turn.direction = Some(TurnDirection::Left);
        assert_eq!(state.turn_order(), vec![2, 1, 0]);
        assert_eq!(state.next_hero_after(None), Some(2));
        assert_eq!(state.next_hero_after(Some(1)), Some(0));
    }

    #[test]
    fn fallen_heroes_are_skipped_when_order_is_computed() {
        let mut state = sample_state();
        state.turn.direction = Some(TurnDirection::Right);
        state.party[1].health = 0;
        assert_eq!(state.next_hero_after(Some(0)), Some(2));

        state.party[1].health = 3;
        assert_eq!(state.next_hero_after(Some(0)), Some(1), "revived heroes resume");
    }

    #[test]
    fn statuses_expire_at_zero_and_permanent_ones_stay() {
        let mut state = sample_state();
        state.statuses = vec![
            StatusEffect::new(StatusKind::RollBonus, StatusTarget::Monster, 1, 1),
            StatusEffect::new(StatusKind::RollBonus, StatusTarget::Hero { index: 0 }, -1, 1),
            StatusEffect::new(StatusKind::Thorns, StatusTarget::Monster, 2, 1),
        ];

        let expired = state.tick_statuses();
        assert_eq!(expired.len(), 1);
        assert_eq!(state.statuses.len(), 2);
        assert_eq!(state.statuses[0].duration, -1);
        assert_eq!(state.statuses[1].duration, 1);
    }

    #[test]
    fn terminal_check_declares_victory_first() {
        let mut state = sample_state();
        state.monster.health = 0;
        assert_eq!(state.check_terminal(), Some(CombatOutcome::Victory));
        assert_eq!(state.phase, CombatPhase::Victory);
    }

    #[test]
    fn terminal_check_declares_defeat_when_everyone_falls() {
        let mut state = sample_state();
        for hero in &mut state.party {
            hero.health = 0;
        }
        assert_eq!(state.check_terminal(), Some(CombatOutcome::Defeat));
    }

    #[test]
    fn integrity_check_catches_lost_cards() {
        let mut state = sample_state();
        state.integrity_check().expect("fresh state is consistent");
        state.piles.draw.pop();
        assert!(matches!(
            state.integrity_check(),
            Err(IntegrityError::CardCountMismatch { .. })
        ));
    }

    #[test]
    fn integrity_check_catches_health_overflow() {
        let mut state = sample_state();
        state.party[2].health = 99;
        assert!(matches!(
            state.integrity_check(),
            Err(IntegrityError::HeroHealthOutOfBounds { index: 2, .. })
        ));
    }

    #[test]
    fn log_timestamps_are_monotonic() {
        let mut state = sample_state();
        state.record(LogCategory::Setup, "one");
        state.record(LogCategory::Setup, "two");
        assert_eq!(state.log[0].timestamp, 0);
        assert_eq!(state.log[1].timestamp, 1);
    }

    #[test]
    fn tapping_skips_already_tapped_cards() {
        let mut state = sample_state();
        let mut first = Card::new(Rank::Two, Suit::Clubs);
        first.tapped = true;
        state.monster.attached_cards = vec![first, Card::new(Rank::Four, Suit::Clubs)];
        state.card_total += 2;

        let tapped = state.tap_attached(Actor::Monster, 1);
        assert_eq!(tapped, vec![Card {
            tapped: true,
            ..Card::new(Rank::Four, Suit::Clubs)
        }]);
        assert!(state.monster.attached_cards.iter().all(|card| card.tapped));
    }

    #[test]
    fn elite_gold_is_floored() {
        assert_eq!(Difficulty::Elite.scale_gold(70), 105);
        assert_eq!(Difficulty::Elite.scale_gold(25), 37);
        assert_eq!(Difficulty::Boss.scale_gold(25), 50);
    }
}
