//! 伤害结算管线。每一次扣血后立即做终局检查。

use serde::{Deserialize, Serialize};

use super::config::EngineConfig;
use super::entities::{MarkerKind, StatusKind, StatusTarget, Vitals};
use super::state::{Actor, CombatState, LogCategory};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum DamageSource {
    /// 掷骰效果，`roll` 为截断后的点数。
    Roll { roll: u32 },
    Ability,
    Special,
    Match,
}

impl DamageSource {
    pub fn clamped_roll(self) -> Option<u32> {
        match self {
            DamageSource::Roll { roll } => Some(roll),
            _ => None,
        }
    }

    /// 荆棘与反射只回应掷骰和技能造成的伤害。
    pub fn provokes_retaliation(self) -> bool {
        matches!(
            self,
            DamageSource::Roll { .. } | DamageSource::Ability | DamageSource::Special
        )
    }

    fn is_low_roll(self) -> bool {
        matches!(self, DamageSource::Roll { roll } if (1..=3).contains(&roll))
    }
}

fn enraged(amount: u32) -> u32 {
    (amount * 3 + 1) / 2
}

/// 按攻守双方分派到对应的伤害路径。`single_target` 为假时不触发“被标记”。
pub fn deal(
    state: &mut CombatState,
    attacker: Actor,
    victim: Actor,
    amount: u32,
    source: DamageSource,
    single_target: bool,
    config: &EngineConfig,
) -> u32 {
    match (attacker, victim) {
        (Actor::Hero { index }, Actor::Monster) => strike_monster(state, index, amount, source),
        (Actor::Monster, Actor::Hero { index }) => {
            strike_hero(state, index, amount, source, single_target, config)
        }
        _ => wound(state, victim, amount),
    }
}

/// 英雄攻击怪物：附魔、激怒、花色克制，然后是反射与荆棘。
pub fn strike_monster(
    state: &mut CombatState,
    hero_index: usize,
    base: u32,
    source: DamageSource,
) -> u32 {
    let Some(hero) = state.party.get(hero_index) else {
        log::warn!("hero {hero_index} cannot strike, no such hero");
        return 0;
    };
    let hero_name = hero.name.clone();
    let suit = hero.damage_suit();

    let mut amount = base;
    if let (Some(roll), Some(enchantment)) = (source.clamped_roll(), hero.enchantment()) {
        amount += enchantment.bonus_damage(roll);
    }
    if source.is_low_roll()
        && state.has_status(StatusKind::Enrage, StatusTarget::Hero { index: hero_index })
    {
        amount = enraged(amount);
    }
    amount = state.monster.adjust_for_suit(amount, suit);

    let dealt = state.monster.apply_damage(amount);
    let monster_name = state.monster.name.clone();
    state.record(
        LogCategory::Damage,
        format!("{hero_name} deals {dealt} damage to {monster_name}"),
    );
    if state.check_terminal().is_some() {
        return dealt;
    }

    if source.provokes_retaliation() {
        retaliate(state, Actor::Hero { index: hero_index }, Actor::Monster, dealt);
    }
    dealt
}

/// 怪物攻击英雄：激怒、标记、闪避，然后是反射与荆棘。
pub fn strike_hero(
    state: &mut CombatState,
    hero_index: usize,
    base: u32,
    source: DamageSource,
    single_target: bool,
    config: &EngineConfig,
) -> u32 {
    if hero_index >= state.party.len() {
        log::warn!("monster cannot strike hero {hero_index}, no such hero");
        return 0;
    }

    let mut amount = base;
    if source.is_low_roll() && state.has_status(StatusKind::Enrage, StatusTarget::Monster) {
        amount = enraged(amount);
    }

    let hero = &mut state.party[hero_index];
    if single_target && hero.take_marker(MarkerKind::Marked) {
        amount += 1;
    }
    if amount > config.dodge_threshold && hero.take_marker(MarkerKind::Dodge) {
        let name = hero.name.clone();
        state.record(
            LogCategory::Dodge,
            format!("{name} dodges a {amount} damage hit"),
        );
        return 0;
    }

    let dealt = hero.apply_damage(amount);
    let hero_name = hero.name.clone();
    let monster_name = state.monster.name.clone();
    state.record(
        LogCategory::Damage,
        format!("{monster_name} deals {dealt} damage to {hero_name}"),
    );
    if state.check_terminal().is_some() {
        return dealt;
    }

    if source.provokes_retaliation() {
        retaliate(state, Actor::Monster, Actor::Hero { index: hero_index }, dealt);
    }
    dealt
}

fn retaliate(state: &mut CombatState, attacker: Actor, victim: Actor, dealt: u32) {
    if dealt == 0 {
        return;
    }
    let holder = StatusTarget::from(victim);

    if state.has_status(StatusKind::Reflection, holder) {
        let reflected = dealt / 2;
        if reflected > 0 {
            let name = state.actor_name(victim);
            state.record(
                LogCategory::Status,
                format!("{name} reflects {reflected} damage"),
            );
            wound(state, attacker, reflected);
            if state.is_finished() {
                return;
            }
        }
    }

    let thorns = state.status_total(StatusKind::Thorns, holder);
    if thorns > 0 {
        let name = state.actor_name(victim);
        state.record(LogCategory::Status, format!("{name}'s thorns bite back"));
        wound(state, attacker, thorns as u32);
    }
}

/// 不经任何修正的直接扣血：自伤、毒、反伤。
pub fn wound(state: &mut CombatState, victim: Actor, amount: u32) -> u32 {
    let Some(entity) = state.vitals_mut(victim) else {
        return 0;
    };
    let dealt = entity.apply_damage(amount);
    let name = state.actor_name(victim);
    state.record(LogCategory::Damage, format!("{name} takes {dealt} damage"));
    state.check_terminal();
    dealt
}

/// 治疗。倒下的目标不会被救回。
pub fn restore(state: &mut CombatState, patient: Actor, amount: u32) -> u32 {
    let Some(entity) = state.vitals_mut(patient) else {
        return 0;
    };
    if entity.is_fallen() {
        return 0;
    }
    let healed = entity.heal(amount);
    let name = state.actor_name(patient);
    state.record(LogCategory::Heal, format!("{name} recovers {healed} health"));
    healed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{Enchantment, Hero, StatusEffect, Weapon};
    use crate::game::registry::Specialization;
    use crate::game::state::CombatPhase;
    use crate::game::testing::{sample_state, test_config};

    fn damage_entries(state: &CombatState) -> usize {
        state
            .log
            .iter()
            .filter(|entry| entry.category == LogCategory::Damage)
            .count()
    }

    #[test]
    fn dodge_negates_a_heavy_hit_and_is_consumed() {
        let mut state = sample_state();
        let config = test_config();
        state.party[0].add_marker(MarkerKind::Dodge);
        let before = state.party[0].health;

        let dealt = strike_hero(&mut state, 0, 5, DamageSource::Roll { roll: 4 }, true, &config);

        assert_eq!(dealt, 0);
        assert_eq!(state.party[0].health, before);
        assert!(!state.party[0].has_marker(MarkerKind::Dodge));
        assert_eq!(damage_entries(&state), 0);
    }

    #[test]
    fn dodge_ignores_hits_at_the_threshold() {
        let mut state = sample_state();
        let config = test_config();
        state.party[0].add_marker(MarkerKind::Dodge);
        let before = state.party[0].health;

        strike_hero(&mut state, 0, 2, DamageSource::Roll { roll: 2 }, true, &config);

        assert_eq!(state.party[0].health, before - 2);
        assert!(state.party[0].has_marker(MarkerKind::Dodge));
    }

    #[test]
    fn marked_heroes_take_one_more_and_lose_the_mark() {
        let mut state = sample_state();
        let config = test_config();
        state.party[1].add_marker(MarkerKind::Marked);
        let before = state.party[1].health;

        strike_hero(&mut state, 1, 2, DamageSource::Special, true, &config);

        assert_eq!(state.party[1].health, before - 3);
        assert!(!state.party[1].has_marker(MarkerKind::Marked));
    }

    #[test]
    fn a_raised_dodge_threshold_lets_heavier_hits_through() {
        let mut state = sample_state();
        let config = test_config().with_dodge_threshold(5);
        state.party[0].add_marker(MarkerKind::Dodge);
        let before = state.party[0].health;

        strike_hero(&mut state, 0, 5, DamageSource::Roll { roll: 4 }, true, &config);
        assert_eq!(state.party[0].health, before - 5);
        assert!(state.party[0].has_marker(MarkerKind::Dodge));

        let dealt = strike_hero(&mut state, 0, 6, DamageSource::Roll { roll: 4 }, true, &config);
        assert_eq!(dealt, 0);
        assert!(!state.party[0].has_marker(MarkerKind::Dodge));
    }

    #[test]
    fn spread_hits_leave_the_mark_in_place() {
        let mut state = sample_state();
        let config = test_config();
        state.party[1].add_marker(MarkerKind::Marked);
        let before = state.party[1].health;

        strike_hero(&mut state, 1, 2, DamageSource::Match, false, &config);

        assert_eq!(state.party[1].health, before - 2);
        assert!(state.party[1].has_marker(MarkerKind::Marked));
    }

    #[test]
    fn trickster_thorns_answer_a_monster_special() {
        let mut state = sample_state();
        let config = test_config();
        state.party[1] = Hero::new(Specialization::Trickster);
        state.statuses.push(StatusEffect::new(
            StatusKind::Thorns,
            StatusTarget::Hero { index: 1 },
            2,
            1,
        ));
        let before = state.monster.health;

        strike_hero(&mut state, 1, 2, DamageSource::Special, true, &config);

        assert_eq!(state.monster.health, before - 1);
    }

    #[test]
    fn keen_weapons_add_damage_on_middle_rolls() {
        let mut state = sample_state();
        state.party[0] = state.party[0]
            .clone()
            .with_weapon(Weapon::new("Longsword").with_enchantment(Enchantment::Keen));

        // 10♠ 对哥布林是易伤花色
        let dealt = strike_monster(&mut state, 0, 2, DamageSource::Roll { roll: 3 });
        assert_eq!(dealt, 5);

        let dealt = strike_monster(&mut state, 0, 2, DamageSource::Ability);
        assert_eq!(dealt, 3, "enchantments only modify rolls");
    }

    #[test]
    fn enrage_scales_low_rolls_up() {
        let mut state = sample_state();
        state.statuses.push(StatusEffect::new(
            StatusKind::Enrage,
            StatusTarget::Hero { index: 1 },
            2,
            0,
        ));

        // 9♣ 对哥布林无克制：3 × 1.5 = 4.5 → 5
        let dealt = strike_monster(&mut state, 1, 3, DamageSource::Roll { roll: 2 });
        assert_eq!(dealt, 5);
        let dealt = strike_monster(&mut state, 1, 3, DamageSource::Roll { roll: 5 });
        assert_eq!(dealt, 3);
    }

    #[test]
    fn thorns_and_reflection_hurt_the_attacker() {
        let mut state = sample_state();
        state.statuses.push(StatusEffect::new(
            StatusKind::Reflection,
            StatusTarget::Monster,
            2,
            0,
        ));
        state.statuses.push(StatusEffect::new(
            StatusKind::Thorns,
            StatusTarget::Monster,
            2,
            1,
        ));
        let before = state.party[1].health;

        strike_monster(&mut state, 1, 4, DamageSource::Ability);

        assert_eq!(state.party[1].health, before - 3, "2 reflected plus 1 thorns");
    }

    #[test]
    fn match_damage_does_not_provoke_thorns() {
        let mut state = sample_state();
        state.statuses.push(StatusEffect::new(
            StatusKind::Thorns,
            StatusTarget::Monster,
            2,
            1,
        ));
        let before = state.party[1].health;

        strike_monster(&mut state, 1, 2, DamageSource::Match);

        assert_eq!(state.party[1].health, before);
    }

    #[test]
    fn a_killing_blow_preempts_retaliation() {
        let mut state = sample_state();
        state.monster.health = 2;
        state.statuses.push(StatusEffect::new(
            StatusKind::Thorns,
            StatusTarget::Monster,
            2,
            3,
        ));
        let before = state.party[1].health;

        strike_monster(&mut state, 1, 5, DamageSource::Roll { roll: 5 });

        assert_eq!(state.phase, CombatPhase::Victory);
        assert_eq!(state.party[1].health, before);
    }

    #[test]
    fn healing_never_exceeds_max_health() {
        let mut state = sample_state();
        state.party[2].health = 12;
        let healed = restore(&mut state, Actor::Hero { index: 2 }, 5);
        assert_eq!(healed, 2);
        assert_eq!(state.party[2].health, state.party[2].max_health);
    }

    #[test]
    fn healing_does_not_revive_the_fallen() {
        let mut state = sample_state();
        state.party[2].health = 0;
        let healed = restore(&mut state, Actor::Hero { index: 2 }, 5);
        assert_eq!(healed, 0);
        assert!(state.party[2].is_fallen());
    }
}
