use serde::{Deserialize, Serialize};

use super::damage;
use super::entities::{Enchantment, MarkerKind, StatusEffect, StatusKind, StatusTarget, Vitals};
use super::error::CombatError;
use super::state::{Actor, CombatState, LogCategory};

/// 宿主在两步之间使用的道具。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Item {
    HealthPotion,
    GreaterPotion,
    SmokeBomb,
    FocusCharm,
    BlockingScroll,
    EnchantScroll { enchantment: Enchantment },
}

impl Item {
    pub fn label(&self) -> String {
        match self {
            Item::HealthPotion => "Health Potion".to_string(),
            Item::GreaterPotion => "Greater Potion".to_string(),
            Item::SmokeBomb => "Smoke Bomb".to_string(),
            Item::FocusCharm => "Focus Charm".to_string(),
            Item::BlockingScroll => "Blocking Scroll".to_string(),
            Item::EnchantScroll { enchantment } => {
                format!("Enchant Scroll ({})", enchantment.label())
            }
        }
    }

    fn targets_monster(&self) -> bool {
        matches!(self, Item::BlockingScroll)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ItemTarget {
    Hero { index: usize },
    Monster,
}

/// 校验目标后把道具效果写入状态。非法目标返回错误，状态不变。
pub fn apply_item(
    state: &mut CombatState,
    item: &Item,
    target: ItemTarget,
) -> Result<(), CombatError> {
    let invalid = || CombatError::InvalidItemTarget {
        item: item.label(),
        target,
    };

    let hero_index = match target {
        ItemTarget::Monster if item.targets_monster() => None,
        ItemTarget::Monster => return Err(invalid()),
        ItemTarget::Hero { .. } if item.targets_monster() => return Err(invalid()),
        ItemTarget::Hero { index } => {
            let hero = state
                .party
                .get(index)
                .ok_or(CombatError::HeroNotFound { index })?;
            if hero.is_fallen() {
                return Err(CombatError::HeroFallen { index });
            }
            Some(index)
        }
    };

    match (item, hero_index) {
        (Item::HealthPotion, Some(index)) => {
            damage::restore(state, Actor::Hero { index }, 5);
        }
        (Item::GreaterPotion, Some(index)) => {
            damage::restore(state, Actor::Hero { index }, 10);
        }
        (Item::SmokeBomb, Some(index)) => {
            state.party[index].add_marker(MarkerKind::Dodge);
        }
        (Item::FocusCharm, Some(index)) => {
            state.party[index].add_marker(MarkerKind::BonusRoll);
        }
        (Item::BlockingScroll, None) => {
            state.statuses.push(StatusEffect::new(
                StatusKind::AbilityBlocked,
                StatusTarget::Monster,
                StatusEffect::PERMANENT,
                0,
            ));
        }
        (Item::EnchantScroll { enchantment }, Some(index)) => {
            let weapon = state.party[index]
                .weapon
                .as_mut()
                .ok_or(CombatError::NoWeapon { index })?;
            weapon.enchantment = Some(*enchantment);
        }
        _ => return Err(invalid()),
    }

    let name = match hero_index {
        Some(index) => state.party[index].name.clone(),
        None => state.monster.name.clone(),
    };
    state.record(
        LogCategory::Item,
        format!("{} is used on {name}", item.label()),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Weapon;
    use crate::game::testing::sample_state;

    #[test]
    fn potions_heal_living_heroes() {
        let mut state = sample_state();
        state.party[0].health = 4;
        apply_item(&mut state, &Item::GreaterPotion, ItemTarget::Hero { index: 0 })
            .expect("potion should apply");
        assert_eq!(state.party[0].health, 14);
    }

    #[test]
    fn fallen_heroes_cannot_be_targeted() {
        let mut state = sample_state();
        state.party[1].health = 0;
        let result = apply_item(&mut state, &Item::HealthPotion, ItemTarget::Hero { index: 1 });
        assert_eq!(result, Err(CombatError::HeroFallen { index: 1 }));
        assert_eq!(state.party[1].health, 0);
    }

    #[test]
    fn missing_heroes_are_rejected() {
        let mut state = sample_state();
        let result = apply_item(&mut state, &Item::SmokeBomb, ItemTarget::Hero { index: 7 });
        assert_eq!(result, Err(CombatError::HeroNotFound { index: 7 }));
    }

    #[test]
    fn blocking_scroll_only_targets_the_monster() {
        let mut state = sample_state();
        let result = apply_item(&mut state, &Item::BlockingScroll, ItemTarget::Hero { index: 0 });
        assert!(matches!(result, Err(CombatError::InvalidItemTarget { .. })));

        apply_item(&mut state, &Item::BlockingScroll, ItemTarget::Monster)
            .expect("scroll should apply");
        assert!(state.has_status(StatusKind::AbilityBlocked, StatusTarget::Monster));
    }

    #[test]
    fn enchanting_requires_a_weapon() {
        let mut state = sample_state();
        let scroll = Item::EnchantScroll {
            enchantment: Enchantment::Blessed,
        };
        let result = apply_item(&mut state, &scroll, ItemTarget::Hero { index: 2 });
        assert_eq!(result, Err(CombatError::NoWeapon { index: 2 }));

        state.party[2].weapon = Some(Weapon::new("Staff"));
        apply_item(&mut state, &scroll, ItemTarget::Hero { index: 2 })
            .expect("scroll should apply");
        assert_eq!(state.party[2].enchantment(), Some(Enchantment::Blessed));
    }

    #[test]
    fn markers_come_from_consumables() {
        let mut state = sample_state();
        apply_item(&mut state, &Item::SmokeBomb, ItemTarget::Hero { index: 0 })
            .expect("smoke bomb should apply");
        apply_item(&mut state, &Item::FocusCharm, ItemTarget::Hero { index: 0 })
            .expect("focus charm should apply");
        assert!(state.party[0].has_marker(MarkerKind::Dodge));
        assert!(state.party[0].has_marker(MarkerKind::BonusRoll));
    }
}
