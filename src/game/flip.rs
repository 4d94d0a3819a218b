//! 翻牌与配对结算，以及附属牌的发牌和四条重发检查。

use std::collections::HashMap;

use super::cards::{Card, Rank};
use super::config::EngineConfig;
use super::damage::{self, DamageSource};
use super::effects::EffectContext;
use super::entities::{StatusKind, StatusTarget, Vitals};
use super::error::CombatError;
use super::rng::CombatRng;
use super::state::{Actor, CombatState, LogCategory};

const FLIP_COUNT: usize = 2;

fn flip_cards<R: CombatRng>(
    state: &mut CombatState,
    actor: Actor,
    rng: &mut R,
) -> Result<Vec<Card>, CombatError> {
    let mut flipped = Vec::with_capacity(FLIP_COUNT);
    for _ in 0..FLIP_COUNT {
        flipped.push(state.piles.draw(rng)?);
    }
    let name = state.actor_name(actor);
    state.record(
        LogCategory::Flip,
        format!("{name} flips {} and {}", flipped[0], flipped[1]),
    );
    Ok(flipped)
}

fn discard_all(state: &mut CombatState, cards: Vec<Card>) {
    for card in cards {
        state.piles.discard(card);
    }
}

/// 英雄翻牌：职业牌点数命中时释放专精技能，否则按附属牌配对造成伤害。
pub fn hero_flip<R: CombatRng>(
    state: &mut CombatState,
    index: usize,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<(), CombatError> {
    let actor = Actor::Hero { index };
    let flipped = flip_cards(state, actor, rng)?;
    let result = resolve_hero_flip(state, index, &flipped, config, rng);
    discard_all(state, flipped);
    result
}

fn resolve_hero_flip<R: CombatRng>(
    state: &mut CombatState,
    index: usize,
    flipped: &[Card],
    config: &EngineConfig,
    rng: &mut R,
) -> Result<(), CombatError> {
    let hero = state
        .party
        .get(index)
        .ok_or(CombatError::HeroNotFound { index })?;
    let class_match = flipped
        .iter()
        .any(|card| card.matches_rank(hero.class_rank()));

    if class_match && hero.ability_available() {
        let ability = hero.ability.clone();
        let name = hero.name.clone();
        state.record(
            LogCategory::Ability,
            format!("{name} uses {}", ability.label()),
        );
        let ctx = EffectContext::new(Actor::Hero { index }, DamageSource::Ability);
        ability.effect.apply(&ctx, state, config, rng)?;
        state.party[index].consume_ability();
        return Ok(());
    }
    if class_match {
        log::debug!("{} matched the class card but the ability is spent", hero.name);
    }

    let matches = hero.count_matches(flipped);
    let match_damage = hero.match_damage;
    let name = hero.name.clone();
    if matches == 0 {
        state.record(LogCategory::Match, format!("{name} finds no match"));
        return Ok(());
    }

    state.record(
        LogCategory::Match,
        format!("{name} matches {matches} attached card(s)"),
    );
    for _ in 0..matches {
        if state.is_finished() {
            break;
        }
        damage::strike_monster(state, index, match_damage, DamageSource::Match);
    }
    Ok(())
}

/// 怪物翻牌：满足触发条件时释放特技（可被封印抵消），否则按配对伤害每位英雄。
pub fn monster_flip<R: CombatRng>(
    state: &mut CombatState,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<(), CombatError> {
    let flipped = flip_cards(state, Actor::Monster, rng)?;
    let result = resolve_monster_flip(state, &flipped, config, rng);
    discard_all(state, flipped);
    result
}

fn resolve_monster_flip<R: CombatRng>(
    state: &mut CombatState,
    flipped: &[Card],
    config: &EngineConfig,
    rng: &mut R,
) -> Result<(), CombatError> {
    let name = state.monster.name.clone();

    if state.monster.special_triggered(flipped) {
        let special = state.monster.special.clone();
        if state
            .take_status(StatusKind::AbilityBlocked, StatusTarget::Monster)
            .is_some()
        {
            state.record(
                LogCategory::Blocked,
                format!("{name}'s {} is blocked", special.name),
            );
            return Ok(());
        }
        state.record(
            LogCategory::Special,
            format!("{name} unleashes {}", special.label()),
        );
        let ctx = EffectContext::new(Actor::Monster, DamageSource::Special);
        special.effect.apply(&ctx, state, config, rng)?;
        return Ok(());
    }

    let match_damage = state.monster.match_damage;
    let mut any_match = false;
    for index in state.living_heroes() {
        let matches = state.party[index].count_matches(flipped);
        for _ in 0..matches {
            if state.is_finished() {
                return Ok(());
            }
            if state.party[index].is_fallen() {
                break;
            }
            any_match = true;
            damage::strike_hero(state, index, match_damage, DamageSource::Match, false, config);
        }
    }
    if !any_match {
        state.record(LogCategory::Match, format!("{name} finds no match"));
    }
    Ok(())
}

/// 按计划从抽牌堆发附属牌，返回本次发出的牌。
pub fn deal<R: CombatRng>(
    state: &mut CombatState,
    plan: &[(Actor, usize)],
    rng: &mut R,
) -> Result<Vec<(Actor, Card)>, CombatError> {
    let mut dealt = Vec::new();
    for (holder, count) in plan {
        for _ in 0..*count {
            let card = state.piles.draw(rng)?;
            state.attach(*holder, card.clone());
            dealt.push((*holder, card));
        }
    }
    Ok(dealt)
}

/// 桌面上（附属牌与职业牌）每个点数的张数，不计王牌。
fn rank_counts(state: &CombatState) -> HashMap<Rank, usize> {
    let mut counts = HashMap::new();
    let hero_cards = state
        .party
        .iter()
        .flat_map(|hero| hero.attached_cards.iter().chain(std::iter::once(&hero.class_card)));
    for card in hero_cards.chain(state.monster.attached_cards.iter()) {
        if !card.is_joker {
            *counts.entry(card.rank).or_insert(0) += 1;
        }
    }
    counts
}

pub fn four_of_a_kind(state: &CombatState) -> Option<Rank> {
    let counts = rank_counts(state);
    let mut quads: Vec<Rank> = counts
        .into_iter()
        .filter(|(_, count)| *count >= 4)
        .map(|(rank, _)| rank)
        .collect();
    quads.sort();
    quads.first().copied()
}

fn undo_deal<R: CombatRng>(state: &mut CombatState, dealt: Vec<(Actor, Card)>, rng: &mut R) {
    let mut returned = Vec::with_capacity(dealt.len());
    for (holder, card) in dealt {
        let detached = state
            .vitals_mut(holder)
            .and_then(|entity| entity.detach_card(&card));
        if let Some(card) = detached {
            returned.push(card);
        }
    }
    state.piles.return_to_draw(returned, rng);
}

/// 发牌并保证桌面上没有四条。随机重发 `max_redeal_attempts` 次后改用确定性修补，
/// 因此总能终止。返回重发次数。
pub fn deal_with_redeal<R: CombatRng>(
    state: &mut CombatState,
    plan: &[(Actor, usize)],
    config: &EngineConfig,
    rng: &mut R,
) -> Result<u32, CombatError> {
    let mut attempts = 0;
    loop {
        let dealt = deal(state, plan, rng)?;
        let Some(rank) = four_of_a_kind(state) else {
            return Ok(attempts);
        };
        if attempts >= config.max_redeal_attempts {
            state.record(
                LogCategory::Redeal,
                format!("Four {} on the table, swapping cards out", rank.label()),
            );
            repair(state, &dealt);
            return Ok(attempts);
        }
        attempts += 1;
        state.record(
            LogCategory::Redeal,
            format!("Four {} on the table, redealing", rank.label()),
        );
        undo_deal(state, dealt, rng);
    }
}

/// 把造成四条的新发牌换成抽牌堆里第一张点数未饱和的牌。
fn repair(state: &mut CombatState, dealt: &[(Actor, Card)]) {
    while let Some(rank) = four_of_a_kind(state) {
        let offender = dealt.iter().find(|(holder, card)| {
            card.matches_rank(rank)
                && state
                    .vitals(*holder)
                    .map(|entity| entity.attached().iter().any(|held| held.same_card(card)))
                    .unwrap_or(false)
        });
        let Some((holder, card)) = offender.cloned() else {
            log::warn!("four {} on the table cannot be repaired", rank.label());
            return;
        };

        let counts = rank_counts(state);
        let replacement = state.piles.take_from_draw(|candidate| {
            candidate.is_joker || counts.get(&candidate.rank).copied().unwrap_or(0) < 3
        });
        let Some(replacement) = replacement else {
            log::warn!("no replacement card for {card}, leaving four {}", rank.label());
            return;
        };

        if let Some(removed) = state
            .vitals_mut(holder)
            .and_then(|entity| entity.detach_card(&card))
        {
            state.piles.draw.insert(0, removed);
        }
        log::debug!("swapped {card} for {replacement}");
        state.attach(holder, replacement);
    }
}
