use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::items::ItemTarget;
use super::state::CombatPhase;

/// 牌数、生命值等不变量被破坏。对当前战斗是致命的。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum IntegrityError {
    #[error("draw and discard piles are both empty")]
    PilesExhausted,
    #[error("hero {index} has {health} health, outside 0..={max_health}")]
    HeroHealthOutOfBounds {
        index: usize,
        health: u32,
        max_health: u32,
    },
    #[error("monster has {health} health, outside 0..={max_health}")]
    MonsterHealthOutOfBounds { health: u32, max_health: u32 },
    #[error("expected {expected} peon cards in play, found {actual}")]
    CardCountMismatch { expected: usize, actual: usize },
    #[error("expected {expected} environment cards, found {actual}")]
    EnvironmentCountMismatch { expected: usize, actual: usize },
    #[error("roll table of {owner} has {len} entries")]
    MalformedRollTable { owner: String, len: usize },
    #[error("acting hero {index} does not exist")]
    ActorOutOfRange { index: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum CombatError {
    #[error("the combat has already finished")]
    CombatFinished,
    #[error("{action} is not accepted during {actual:?}")]
    WrongPhase { action: String, actual: CombatPhase },
    #[error("stale step {actual}, the combat is at step {expected}")]
    StaleStep { expected: u64, actual: u64 },
    #[error("a combat needs at least one hero")]
    EmptyParty,
    #[error("hero {index} does not exist")]
    HeroNotFound { index: usize },
    #[error("hero {index} has fallen")]
    HeroFallen { index: usize },
    #[error("{item} cannot be used on {target:?}")]
    InvalidItemTarget { item: String, target: ItemTarget },
    #[error("hero {index} carries no weapon")]
    NoWeapon { index: usize },
    #[error("integrity violation: {error}")]
    IntegrityViolation { error: IntegrityError },
}

impl CombatError {
    /// 不变量破坏是致命错误；其余都是被拒绝的非法操作，状态保持不变。
    pub fn is_fatal(&self) -> bool {
        matches!(self, CombatError::IntegrityViolation { .. })
    }
}

impl From<IntegrityError> for CombatError {
    fn from(error: IntegrityError) -> Self {
        CombatError::IntegrityViolation { error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_integrity_violations_are_fatal() {
        assert!(CombatError::from(IntegrityError::PilesExhausted).is_fatal());
        assert!(!CombatError::CombatFinished.is_fatal());
        assert!(!CombatError::HeroFallen { index: 1 }.is_fatal());
    }

    #[test]
    fn errors_serialize_as_tagged_values() {
        let error = CombatError::WrongPhase {
            action: "roll".into(),
            actual: CombatPhase::HeroFlip,
        };
        let json = serde_json::to_value(&error).expect("error should serialize");
        assert_eq!(json["type"], "WrongPhase");
        assert_eq!(json["action"], "roll");
        assert_eq!(error.to_string(), "roll is not accepted during HeroFlip");
    }
}
