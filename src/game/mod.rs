//! 战斗核心逻辑（牌堆、实体、效果、状态机与规则引擎）。

pub mod cards;
pub mod config;
pub mod damage;
pub mod effects;
pub mod entities;
pub mod environment;
pub mod error;
pub mod flip;
pub mod items;
pub mod registry;
pub mod rewards;
pub mod rng;
pub mod rolls;
pub mod rules;
pub mod state;

pub use cards::{Card, CardColor, Piles, Rank, Suit};
pub use config::EngineConfig;
pub use damage::DamageSource;
pub use effects::{
    AbilityDefinition,
    AbilityUsage,
    EffectCondition,
    EffectContext,
    EffectKind,
    EffectOutcome,
    EffectTarget,
    RollTable,
};
pub use entities::{
    Enchantment,
    Hero,
    MarkerKind,
    Monster,
    MonsterSpecial,
    SpecialTrigger,
    StatusEffect,
    StatusKind,
    StatusTarget,
    Vitals,
    Weapon,
};
pub use environment::{EnvironmentCard, EnvironmentKind};
pub use error::{CombatError, IntegrityError};
pub use items::{Item, ItemTarget};
pub use registry::{HeroClass, MonsterKind, Specialization};
pub use rewards::{Reward, RewardEntry};
pub use rng::{CombatRng, ScriptedRng, SeededRng};
pub use rules::{CombatAction, CombatEngine, CombatResolution, CombatSetup};
pub use state::{
    Actor,
    CombatOutcome,
    CombatPhase,
    CombatState,
    Difficulty,
    LogCategory,
    LogEntry,
    TurnDirection,
    TurnState,
};
