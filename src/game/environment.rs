use serde::{Deserialize, Serialize};

use super::cards::{Card, CardColor, Suit};
use super::config::EngineConfig;
use super::entities::{StatusEffect, StatusKind, StatusTarget};
use super::error::CombatError;
use super::flip;
use super::rng::CombatRng;
use super::state::{Actor, CombatState, LogCategory};

/// 环境牌的花色决定本场战斗的环境。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EnvironmentKind {
    BarrenHall,
    TreasureVault,
    Armory,
    ElementalChamber,
}

impl EnvironmentKind {
    /// 无花色的牌按梅花处理。
    pub fn from_card(card: &Card) -> Self {
        match card.suit {
            Some(Suit::Diamonds) => EnvironmentKind::TreasureVault,
            Some(Suit::Hearts) => EnvironmentKind::Armory,
            Some(Suit::Spades) => EnvironmentKind::ElementalChamber,
            Some(Suit::Clubs) | None => EnvironmentKind::BarrenHall,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EnvironmentKind::BarrenHall => "Barren Hall",
            EnvironmentKind::TreasureVault => "Treasure Vault",
            EnvironmentKind::Armory => "Armory",
            EnvironmentKind::ElementalChamber => "Elemental Chamber",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            EnvironmentKind::BarrenHall => "Nothing stirs here.",
            EnvironmentKind::TreasureVault => "Every combatant draws an extra attached card.",
            EnvironmentKind::Armory => {
                "Heroes gain +2 on their first roll; the monster gains +1 to rolls for 3 rounds."
            }
            EnvironmentKind::ElementalChamber => {
                "Black heroes gain +1 to every roll, red heroes draw an extra card, the monster gains 3 health."
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvironmentCard {
    pub card: Card,
    pub kind: EnvironmentKind,
}

/// 翻开环境牌堆最前面的牌并把它轮换到末尾。
pub fn reveal(state: &mut CombatState) -> Option<EnvironmentCard> {
    if state.environment_pile.is_empty() {
        return None;
    }
    let card = state.environment_pile.remove(0);
    state.environment_pile.push(card.clone());
    let kind = EnvironmentKind::from_card(&card);
    Some(EnvironmentCard { card, kind })
}

/// 在战斗开始时结算一次环境效果。
pub fn apply<R: CombatRng>(
    state: &mut CombatState,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<(), CombatError> {
    if state.environment.is_some() {
        log::warn!("environment already applied, skipping");
        return Ok(());
    }
    let Some(environment) = reveal(state) else {
        log::debug!("no environment pile, the combat starts in a barren hall");
        return Ok(());
    };
    let kind = environment.kind;
    state.record(
        LogCategory::Environment,
        format!("{} ({}): {}", kind.name(), environment.card, kind.description()),
    );
    state.environment = Some(environment);

    let mut extra_draws: Vec<(Actor, usize)> = Vec::new();
    match kind {
        EnvironmentKind::BarrenHall => {}
        EnvironmentKind::TreasureVault => {
            for index in 0..state.party.len() {
                extra_draws.push((Actor::Hero { index }, 1));
            }
            extra_draws.push((Actor::Monster, 1));
        }
        EnvironmentKind::Armory => {
            for index in 0..state.party.len() {
                state.statuses.push(StatusEffect::new(
                    StatusKind::FirstRollBonus,
                    StatusTarget::Hero { index },
                    StatusEffect::PERMANENT,
                    2,
                ));
            }
            state.statuses.push(StatusEffect::new(
                StatusKind::RollBonus,
                StatusTarget::Monster,
                3,
                1,
            ));
        }
        EnvironmentKind::ElementalChamber => {
            for index in 0..state.party.len() {
                match state.party[index].color() {
                    CardColor::Black => state.statuses.push(StatusEffect::new(
                        StatusKind::RollBonus,
                        StatusTarget::Hero { index },
                        StatusEffect::PERMANENT,
                        1,
                    )),
                    CardColor::Red => extra_draws.push((Actor::Hero { index }, 1)),
                }
            }
            let gained = state.monster.fortify(3, config.monster_health_cap);
            let name = state.monster.name.clone();
            state.record(
                LogCategory::Environment,
                format!("{name} gains {gained} maximum health"),
            );
        }
    }

    let plan: Vec<(Actor, usize)> = extra_draws
        .into_iter()
        .map(|(holder, count)| {
            let cap = usize::from(match holder {
                Actor::Monster => config.monster_attached_cap,
                Actor::Hero { .. } => config.hero_attached_cap,
            });
            let room = cap.saturating_sub(state.attached_len(holder));
            (holder, count.min(room))
        })
        .filter(|(_, count)| *count > 0)
        .collect();

    if plan.is_empty() {
        return Ok(());
    }
    if config.redeal_after_environment_draws {
        flip::deal_with_redeal(state, &plan, config, rng)?;
    } else {
        flip::deal(state, &plan, rng)?;
    }
    Ok(())
}
