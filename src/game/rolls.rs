//! 掷骰结算：原始点数加成 → 截断 → 查表 → 效果结算，必要时连锁追加掷骰。

use super::config::EngineConfig;
use super::damage::DamageSource;
use super::effects::{EffectContext, EffectOutcome};
use super::entities::{MarkerKind, StatusKind, StatusTarget};
use super::error::{CombatError, IntegrityError};
use super::rng::CombatRng;
use super::state::{Actor, CombatState, LogCategory};

/// 截断前的加值。首次掷骰加成与额外掷骰标记在这里被消耗。
fn raw_bonus(state: &mut CombatState, actor: Actor) -> i64 {
    let holder = StatusTarget::from(actor);
    let mut bonus = i64::from(state.status_total(StatusKind::RollBonus, holder));

    if let Actor::Hero { index } = actor {
        while let Some(first) = state.take_status(StatusKind::FirstRollBonus, holder) {
            bonus += i64::from(first.payload);
        }
        bonus += i64::from(state.status_total(StatusKind::HuntersMark, StatusTarget::Monster));
        if let Some(hero) = state.party.get_mut(index) {
            if hero.take_marker(MarkerKind::BonusRoll) {
                bonus += 1;
            }
        }
    }
    bonus
}

fn roll_once<R: CombatRng>(
    state: &mut CombatState,
    actor: Actor,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<EffectOutcome, CombatError> {
    let table = match actor {
        Actor::Monster => state.monster.roll_effects.clone(),
        Actor::Hero { index } => state
            .party
            .get(index)
            .map(|hero| hero.roll_effects.clone())
            .ok_or(IntegrityError::ActorOutOfRange { index })?,
    };
    let name = state.actor_name(actor);
    if table.len() != config.roll_table_size as usize {
        return Err(IntegrityError::MalformedRollTable {
            owner: name,
            len: table.len(),
        }
        .into());
    }

    let die = rng.roll_die(config.roll_die_sides);
    let bonus = raw_bonus(state, actor);
    let clamped = config.clamp_roll(i64::from(die) + bonus);
    let effect = table
        .entry(clamped)
        .cloned()
        .ok_or(IntegrityError::MalformedRollTable {
            owner: name.clone(),
            len: table.len(),
        })?;

    let bonus_text = if bonus == 0 {
        String::new()
    } else {
        format!(" {bonus:+}")
    };
    state.record(
        LogCategory::Roll,
        format!("{name} rolls {die}{bonus_text} ({clamped}): {}", effect.label()),
    );

    let ctx = EffectContext::new(actor, DamageSource::Roll { roll: clamped });
    let mut outcome = effect.apply(&ctx, state, config, rng)?;

    if let Actor::Hero { index } = actor {
        let payout = state.party[index]
            .enchantment()
            .and_then(|enchantment| enchantment.gilded_payout(clamped));
        if let Some(gold) = payout {
            state.pending_gold += gold;
            state.record(
                LogCategory::Reward,
                format!("{name}'s gilded weapon shakes loose {gold} gold"),
            );
            outcome.roll_again = true;
        }
    }
    Ok(outcome)
}

/// 当前行动者的一次掷骰步骤，追加掷骰最多 `max_roll_chain` 次。
pub fn resolve_roll<R: CombatRng>(
    state: &mut CombatState,
    actor: Actor,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<u32, CombatError> {
    let mut chained = 0;
    loop {
        let outcome = roll_once(state, actor, config, rng)?;
        if state.is_finished() || state.is_actor_fallen(actor) || !outcome.roll_again {
            return Ok(chained);
        }
        if chained >= config.max_roll_chain {
            log::debug!("roll chain capped at {}", config.max_roll_chain);
            return Ok(chained);
        }
        chained += 1;
        let name = state.actor_name(actor);
        state.record(LogCategory::Roll, format!("{name} rolls again"));
    }
}
