use serde::{Deserialize, Serialize};

use super::config::EngineConfig;
use super::damage::{self, DamageSource};
use super::entities::{MarkerKind, StatusEffect, StatusKind, Vitals};
use super::error::CombatError;
use super::rng::CombatRng;
use super::state::{Actor, CombatState, LogCategory};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum EffectTarget {
    /// 行动者自身。
    Actor,
    Monster,
    /// 英雄的对手是怪物；怪物的对手是被标记的英雄，否则随机一名存活英雄。
    Opponent,
    Party,
    RandomHeroes {
        count: u8,
    },
    LowestHealthHero,
}

impl EffectTarget {
    fn phrase(&self) -> String {
        match self {
            EffectTarget::Actor => "self".to_string(),
            EffectTarget::Monster => "the monster".to_string(),
            EffectTarget::Opponent => "the opponent".to_string(),
            EffectTarget::Party => "the party".to_string(),
            EffectTarget::RandomHeroes { count: 1 } => "a random hero".to_string(),
            EffectTarget::RandomHeroes { count } => format!("{count} random heroes"),
            EffectTarget::LowestHealthHero => "the weakest hero".to_string(),
        }
    }

    /// 只命中一个目标的效果才会触发并消耗“被标记”。
    pub fn is_single(&self) -> bool {
        match self {
            EffectTarget::Party => false,
            EffectTarget::RandomHeroes { count } => *count <= 1,
            _ => true,
        }
    }

    /// 解析出本次效果的实际目标。
    pub fn resolve<R: CombatRng>(
        &self,
        ctx: &EffectContext,
        state: &CombatState,
        rng: &mut R,
    ) -> Vec<Actor> {
        match self {
            EffectTarget::Actor => vec![ctx.actor],
            EffectTarget::Monster => vec![Actor::Monster],
            EffectTarget::Opponent => match ctx.actor {
                Actor::Hero { .. } => vec![Actor::Monster],
                Actor::Monster => {
                    let living = state.living_heroes();
                    let marked = living.iter().copied().find(|index| {
                        state.party[*index].has_marker(MarkerKind::Marked)
                    });
                    match marked {
                        Some(index) => vec![Actor::Hero { index }],
                        None if living.is_empty() => Vec::new(),
                        None => vec![Actor::Hero {
                            index: living[rng.choose_index(living.len())],
                        }],
                    }
                }
            },
            EffectTarget::Party => state
                .living_heroes()
                .into_iter()
                .map(|index| Actor::Hero { index })
                .collect(),
            EffectTarget::RandomHeroes { count } => {
                let mut pool = state.living_heroes();
                let mut chosen = Vec::new();
                for _ in 0..*count {
                    if pool.is_empty() {
                        break;
                    }
                    let index = pool.remove(rng.choose_index(pool.len()));
                    chosen.push(Actor::Hero { index });
                }
                chosen
            }
            EffectTarget::LowestHealthHero => state
                .living_heroes()
                .into_iter()
                .min_by_key(|index| (state.party[*index].health, *index))
                .map(|index| vec![Actor::Hero { index }])
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum EffectCondition {
    ActorBelowHalf,
    MonsterBelowHalf,
}

impl EffectCondition {
    pub fn is_satisfied(&self, ctx: &EffectContext, state: &CombatState) -> bool {
        match self {
            EffectCondition::ActorBelowHalf => match ctx.actor {
                Actor::Monster => state.monster.is_below_half(),
                Actor::Hero { index } => state
                    .party
                    .get(index)
                    .map(|hero| hero.is_below_half())
                    .unwrap_or(false),
            },
            EffectCondition::MonsterBelowHalf => state.monster.is_below_half(),
        }
    }

    fn phrase(&self) -> String {
        match self {
            EffectCondition::ActorBelowHalf => "below half health".to_string(),
            EffectCondition::MonsterBelowHalf => "the monster is below half health".to_string(),
        }
    }
}

/// 结构化的效果描述。展示文本由 [`EffectKind::label`] 派生，永远不会被反向解析。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum EffectKind {
    Nothing,
    Damage {
        amount: u32,
        target: EffectTarget,
    },
    Heal {
        amount: u32,
        target: EffectTarget,
    },
    GrantStatus {
        status: StatusKind,
        duration: i32,
        payload: i32,
        target: EffectTarget,
    },
    GrantMarker {
        marker: MarkerKind,
        target: EffectTarget,
    },
    AttachCards {
        count: u8,
        cap: u8,
        target: EffectTarget,
    },
    TapAttached {
        count: u8,
        target: EffectTarget,
    },
    RollAgain,
    Composite {
        effects: Vec<EffectKind>,
    },
    Conditional {
        condition: Box<EffectCondition>,
        effect: Box<EffectKind>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        otherwise: Option<Box<EffectKind>>,
    },
}

impl EffectKind {
    pub fn damage(amount: u32, target: EffectTarget) -> Self {
        EffectKind::Damage { amount, target }
    }

    pub fn heal(amount: u32, target: EffectTarget) -> Self {
        EffectKind::Heal { amount, target }
    }

    pub fn status(status: StatusKind, duration: i32, payload: i32, target: EffectTarget) -> Self {
        EffectKind::GrantStatus {
            status,
            duration,
            payload,
            target,
        }
    }

    pub fn marker(marker: MarkerKind, target: EffectTarget) -> Self {
        EffectKind::GrantMarker { marker, target }
    }

    pub fn all(effects: Vec<EffectKind>) -> Self {
        EffectKind::Composite { effects }
    }

    pub fn when(condition: EffectCondition, effect: EffectKind, otherwise: EffectKind) -> Self {
        EffectKind::Conditional {
            condition: Box::new(condition),
            effect: Box::new(effect),
            otherwise: Some(Box::new(otherwise)),
        }
    }

    pub fn label(&self) -> String {
        match self {
            EffectKind::Nothing => "Nothing happens".to_string(),
            EffectKind::Damage { amount, target } => {
                format!("Deal {amount} damage to {}", target.phrase())
            }
            EffectKind::Heal { amount, target } => {
                format!("Restore {amount} health to {}", target.phrase())
            }
            EffectKind::GrantStatus {
                status,
                duration,
                payload,
                target,
            } => {
                let span = if *duration < 0 {
                    "for the combat".to_string()
                } else {
                    format!("for {duration} rounds")
                };
                format!(
                    "Grant {} {payload} to {} {span}",
                    status.label(),
                    target.phrase()
                )
            }
            EffectKind::GrantMarker { marker, target } => {
                format!("Give {} to {}", marker.label(), target.phrase())
            }
            EffectKind::AttachCards { count, target, .. } => {
                format!("Attach {count} card(s) to {}", target.phrase())
            }
            EffectKind::TapAttached { count, target } => {
                format!("Tap {count} card(s) attached to {}", target.phrase())
            }
            EffectKind::RollAgain => "Roll again".to_string(),
            EffectKind::Composite { effects } => effects
                .iter()
                .map(EffectKind::label)
                .collect::<Vec<_>>()
                .join(", then "),
            EffectKind::Conditional {
                condition,
                effect,
                otherwise,
            } => match otherwise {
                Some(otherwise) => format!(
                    "If {}: {}; otherwise {}",
                    condition.phrase(),
                    effect.label(),
                    otherwise.label()
                ),
                None => format!("If {}: {}", condition.phrase(), effect.label()),
            },
        }
    }

    /// 结算效果。战斗结束或行动者倒下后，剩余部分不再结算。
    pub fn apply<R: CombatRng>(
        &self,
        ctx: &EffectContext,
        state: &mut CombatState,
        config: &EngineConfig,
        rng: &mut R,
    ) -> Result<EffectOutcome, CombatError> {
        let mut outcome = EffectOutcome::default();
        if state.is_finished() || state.is_actor_fallen(ctx.actor) {
            return Ok(outcome);
        }

        match self {
            EffectKind::Nothing => {
                let name = state.actor_name(ctx.actor);
                state.record(LogCategory::Roll, format!("{name}'s effort comes to nothing"));
            }
            EffectKind::Damage { amount, target } => {
                let single = target.is_single();
                for victim in target.resolve(ctx, state, rng) {
                    if state.is_finished() || state.is_actor_fallen(ctx.actor) {
                        break;
                    }
                    damage::deal(state, ctx.actor, victim, *amount, ctx.source, single, config);
                }
            }
            EffectKind::Heal { amount, target } => {
                for patient in target.resolve(ctx, state, rng) {
                    damage::restore(state, patient, *amount);
                }
            }
            EffectKind::GrantStatus {
                status,
                duration,
                payload,
                target,
            } => {
                for holder in target.resolve(ctx, state, rng) {
                    let effect = StatusEffect::new(*status, holder.into(), *duration, *payload);
                    let name = state.actor_name(holder);
                    state.record(
                        LogCategory::Status,
                        format!("{name} gains {}", effect.label()),
                    );
                    state.statuses.push(effect);
                }
            }
            EffectKind::GrantMarker { marker, target } => {
                for holder in target.resolve(ctx, state, rng) {
                    if let Actor::Hero { index } = holder {
                        state.party[index].add_marker(*marker);
                        let name = state.party[index].name.clone();
                        state.record(
                            LogCategory::Marker,
                            format!("{name} gains a {} marker", marker.label()),
                        );
                    } else {
                        log::debug!("markers only attach to heroes, skipping the monster");
                    }
                }
            }
            EffectKind::AttachCards { count, cap, target } => {
                for holder in target.resolve(ctx, state, rng) {
                    for _ in 0..*count {
                        if state.attached_len(holder) >= *cap as usize {
                            break;
                        }
                        let card = state.piles.draw(rng)?;
                        let name = state.actor_name(holder);
                        state.record(
                            LogCategory::Flip,
                            format!("{name} attaches {card}"),
                        );
                        state.attach(holder, card);
                    }
                }
            }
            EffectKind::TapAttached { count, target } => {
                for holder in target.resolve(ctx, state, rng) {
                    let tapped = state.tap_attached(holder, *count as usize);
                    if !tapped.is_empty() {
                        let name = state.actor_name(holder);
                        let labels: Vec<String> =
                            tapped.iter().map(ToString::to_string).collect();
                        state.record(
                            LogCategory::Status,
                            format!("{} attached to {name} tapped", labels.join(", ")),
                        );
                    }
                }
            }
            EffectKind::RollAgain => {
                outcome.roll_again = true;
            }
            EffectKind::Composite { effects } => {
                for effect in effects {
                    if state.is_finished() || state.is_actor_fallen(ctx.actor) {
                        break;
                    }
                    let inner = effect.apply(ctx, state, config, rng)?;
                    outcome.extend(inner);
                }
            }
            EffectKind::Conditional {
                condition,
                effect,
                otherwise,
            } => {
                if condition.is_satisfied(ctx, state) {
                    outcome.extend(effect.apply(ctx, state, config, rng)?);
                } else if let Some(otherwise) = otherwise {
                    outcome.extend(otherwise.apply(ctx, state, config, rng)?);
                }
            }
        }

        Ok(outcome)
    }
}

/// 掷骰效果表：下标 1..=N 对应一个效果。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RollTable {
    pub entries: Vec<EffectKind>,
}

impl RollTable {
    pub fn new(entries: [EffectKind; 6]) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn entry(&self, roll: u32) -> Option<&EffectKind> {
        let index = roll.checked_sub(1)? as usize;
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AbilityUsage {
    OncePerCombat,
    Reusable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AbilityDefinition {
    pub name: String,
    pub effect: EffectKind,
    pub usage: AbilityUsage,
}

impl AbilityDefinition {
    pub fn new(name: impl Into<String>, usage: AbilityUsage, effect: EffectKind) -> Self {
        Self {
            name: name.into(),
            effect,
            usage,
        }
    }

    pub fn label(&self) -> String {
        format!("{}: {}", self.name, self.effect.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectContext {
    pub actor: Actor,
    pub source: DamageSource,
}

impl EffectContext {
    pub fn new(actor: Actor, source: DamageSource) -> Self {
        Self { actor, source }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectOutcome {
    pub roll_again: bool,
}

impl EffectOutcome {
    pub fn extend(&mut self, other: EffectOutcome) {
        self.roll_again |= other.roll_again;
    }
}
