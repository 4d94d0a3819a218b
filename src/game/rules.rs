use serde::{Deserialize, Serialize};

use super::cards::{environment_pile, peon_deck, Card, Piles};
use super::config::EngineConfig;
use super::damage;
use super::entities::{Hero, Monster, StatusKind, StatusTarget, Vitals};
use super::environment;
use super::error::{CombatError, IntegrityError};
use super::flip;
use super::items::{self, Item, ItemTarget};
use super::registry::{MonsterKind, Specialization};
use super::rewards::{self, Reward};
use super::rng::CombatRng;
use super::rolls;
use super::state::{
    Actor, CombatOutcome, CombatPhase, CombatState, Difficulty, LogCategory, LogEntry,
    TurnDirection,
};

/// 宿主交给引擎的开局数据。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CombatSetup {
    pub party: Vec<Hero>,
    pub monster: Monster,
    #[serde(default)]
    pub draw_pile: Vec<Card>,
    #[serde(default)]
    pub discard_pile: Vec<Card>,
    #[serde(default)]
    pub environment_pile: Vec<Card>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl CombatSetup {
    /// 用小兵牌堆（去掉职业牌）和默认环境牌堆组装一场战斗，两者都会洗牌。
    pub fn new<R: CombatRng>(
        party: Vec<Hero>,
        monster: Monster,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Self {
        let mut deck = peon_deck();
        for hero in &party {
            if let Some(position) = deck.iter().position(|card| card.same_card(&hero.class_card)) {
                deck.remove(position);
            }
        }
        rng.shuffle(&mut deck);
        let mut environment = environment_pile();
        rng.shuffle(&mut environment);

        Self {
            party,
            monster,
            draw_pile: deck,
            discard_pile: Vec::new(),
            environment_pile: environment,
            difficulty,
        }
    }

    /// 示例队伍：狂战士、猎人、炎术士对阵哥布林。
    pub fn sample<R: CombatRng>(rng: &mut R) -> Self {
        let party = vec![
            Hero::new(Specialization::Berserker),
            Hero::new(Specialization::Hunter),
            Hero::new(Specialization::Pyromancer),
        ];
        Self::new(party, Monster::new(MonsterKind::GoblinRaider), Difficulty::Normal, rng)
    }

    pub fn with_environment_pile(mut self, pile: Vec<Card>) -> Self {
        self.environment_pile = pile;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum CombatAction {
    ChooseTurnOrder { direction: TurnDirection },
    Flip,
    Roll,
    UseItem { item: Item, target: ItemTarget },
}

impl CombatAction {
    pub fn name(&self) -> &'static str {
        match self {
            CombatAction::ChooseTurnOrder { .. } => "chooseTurnOrder",
            CombatAction::Flip => "flip",
            CombatAction::Roll => "roll",
            CombatAction::UseItem { .. } => "useItem",
        }
    }
}

/// 一步结算的结果：新状态、本步新增的日志以及终局信息。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CombatResolution {
    pub state: CombatState,
    pub entries: Vec<LogEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CombatOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<Reward>,
}

impl CombatResolution {
    pub fn new(state: CombatState, log_start: usize) -> Self {
        let entries = state.log.get(log_start..).map(<[LogEntry]>::to_vec).unwrap_or_default();
        let outcome = state.outcome();
        let reward = state.reward.clone();
        Self {
            state,
            entries,
            outcome,
            reward,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CombatEngine {
    config: EngineConfig,
}

impl CombatEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn ensure_integrity(state: &CombatState) -> Result<(), CombatError> {
        state
            .integrity_check()
            .map_err(|error| CombatError::IntegrityViolation { error })
    }

    fn ensure_tables(&self, state: &CombatState) -> Result<(), CombatError> {
        let expected = self.config.roll_table_size as usize;
        let tables = state
            .party
            .iter()
            .map(|hero| (hero.name.as_str(), hero.roll_effects.len()))
            .chain(std::iter::once((
                state.monster.name.as_str(),
                state.monster.roll_effects.len(),
            )));
        for (owner, len) in tables {
            if len != expected {
                return Err(IntegrityError::MalformedRollTable {
                    owner: owner.to_string(),
                    len,
                }
                .into());
            }
        }
        Ok(())
    }

    fn wrong_phase(action: &CombatAction, state: &CombatState) -> CombatError {
        log::warn!("rejected {} during {:?}", action.name(), state.phase);
        CombatError::WrongPhase {
            action: action.name().to_string(),
            actual: state.phase,
        }
    }

    /// 发附属牌、结算环境，停在选择行动顺序阶段。
    pub fn start<R: CombatRng>(
        &self,
        setup: CombatSetup,
        rng: &mut R,
    ) -> Result<CombatResolution, CombatError> {
        if setup.party.is_empty() {
            return Err(CombatError::EmptyParty);
        }

        let mut party = setup.party;
        for hero in &mut party {
            hero.reset_for_combat();
        }
        let mut state = CombatState::new(
            party,
            setup.monster,
            Piles::new(setup.draw_pile, setup.discard_pile),
            setup.environment_pile,
            setup.difficulty,
        );
        self.ensure_tables(&state)?;
        Self::ensure_integrity(&state)?;

        let names: Vec<String> = state.party.iter().map(|hero| hero.name.clone()).collect();
        let monster_name = state.monster.name.clone();
        state.record(
            LogCategory::Setup,
            format!("{} face the {monster_name}", names.join(", ")),
        );

        let hero_cards = usize::from(
            self.config
                .hero_starting_attached
                .min(self.config.hero_attached_cap),
        );
        let monster_cards = usize::from(
            state
                .monster
                .attached_count
                .min(self.config.monster_attached_cap),
        );
        let mut plan: Vec<(Actor, usize)> = (0..state.party.len())
            .map(|index| (Actor::Hero { index }, hero_cards))
            .collect();
        plan.push((Actor::Monster, monster_cards));

        let redeals = flip::deal_with_redeal(&mut state, &plan, &self.config, rng)?;
        log::info!("attached cards dealt after {redeals} redeal(s)");

        environment::apply(&mut state, &self.config, rng)?;

        state.phase = CombatPhase::ChooseTurnOrder;
        Self::ensure_integrity(&state)?;
        Ok(CombatResolution::new(state, 0))
    }

    /// 结算一步。在副本上操作，只有成功时才返回新状态。
    pub fn next<R: CombatRng>(
        &self,
        state: &CombatState,
        action: CombatAction,
        rng: &mut R,
    ) -> Result<CombatResolution, CombatError> {
        if state.is_finished() {
            return Err(CombatError::CombatFinished);
        }
        Self::ensure_integrity(state)?;

        let mut next = state.clone();
        let log_start = next.log.len();

        match &action {
            CombatAction::ChooseTurnOrder { direction } => {
                if next.phase != CombatPhase::ChooseTurnOrder {
                    return Err(Self::wrong_phase(&action, &next));
                }
                next.turn.direction = Some(*direction);
                next.turn.actor = Actor::Monster;
                next.record(
                    LogCategory::Turn,
                    format!("Heroes act {:?} of the monster", direction),
                );
                Self::begin_monster_turn(&mut next);
            }
            CombatAction::Flip => match (next.phase, next.turn.actor) {
                (CombatPhase::MonsterFlip, _) => {
                    flip::monster_flip(&mut next, &self.config, rng)?;
                    if !next.is_finished() {
                        next.phase = CombatPhase::MonsterRoll;
                    }
                }
                (CombatPhase::HeroFlip, Actor::Hero { index }) => {
                    self.ensure_actor_alive(&next, index)?;
                    flip::hero_flip(&mut next, index, &self.config, rng)?;
                    if !next.is_finished() {
                        if next.party[index].is_fallen() {
                            self.advance_after_hero(&mut next, index)?;
                        } else {
                            next.phase = CombatPhase::HeroRoll;
                        }
                    }
                }
                _ => return Err(Self::wrong_phase(&action, &next)),
            },
            CombatAction::Roll => match (next.phase, next.turn.actor) {
                (CombatPhase::MonsterRoll, _) => {
                    rolls::resolve_roll(&mut next, Actor::Monster, &self.config, rng)?;
                    if !next.is_finished() {
                        self.advance_after_monster(&mut next)?;
                    }
                }
                (CombatPhase::HeroRoll, Actor::Hero { index }) => {
                    self.ensure_actor_alive(&next, index)?;
                    rolls::resolve_roll(&mut next, Actor::Hero { index }, &self.config, rng)?;
                    if !next.is_finished() {
                        self.advance_after_hero(&mut next, index)?;
                    }
                }
                _ => return Err(Self::wrong_phase(&action, &next)),
            },
            CombatAction::UseItem { item, target } => {
                if next.phase == CombatPhase::Setup {
                    return Err(Self::wrong_phase(&action, &next));
                }
                items::apply_item(&mut next, item, *target)?;
            }
        }

        if next.is_finished() {
            log::info!("combat finished with {:?}", next.phase);
            rewards::conclude(&mut next, rng);
        }
        next.step += 1;
        Self::ensure_integrity(&next)?;
        Ok(CombatResolution::new(next, log_start))
    }

    /// 与 `next` 相同，但要求调用方给出当前步数，拒绝重复提交的旧事件。
    pub fn next_checked<R: CombatRng>(
        &self,
        state: &CombatState,
        expected_step: u64,
        action: CombatAction,
        rng: &mut R,
    ) -> Result<CombatResolution, CombatError> {
        if state.step != expected_step {
            log::warn!(
                "stale step {expected_step} rejected, combat is at {}",
                state.step
            );
            return Err(CombatError::StaleStep {
                expected: state.step,
                actual: expected_step,
            });
        }
        self.next(state, action, rng)
    }

    fn ensure_actor_alive(&self, state: &CombatState, index: usize) -> Result<(), CombatError> {
        let hero = state
            .party
            .get(index)
            .ok_or(IntegrityError::ActorOutOfRange { index })?;
        if hero.is_fallen() {
            return Err(CombatError::HeroFallen { index });
        }
        Ok(())
    }

    fn begin_monster_turn(state: &mut CombatState) {
        state.turn.actor = Actor::Monster;
        state.phase = CombatPhase::MonsterFlip;
        let name = state.monster.name.clone();
        state.record(
            LogCategory::Turn,
            format!("Round {}: {name} acts", state.turn.round),
        );
    }

    fn begin_hero_turn(state: &mut CombatState, index: usize) {
        state.turn.actor = Actor::Hero { index };
        state.phase = CombatPhase::HeroFlip;
        let name = state.party[index].name.clone();
        state.record(LogCategory::Turn, format!("{name}'s turn"));
    }

    fn advance_after_monster(&self, state: &mut CombatState) -> Result<(), CombatError> {
        match state.next_hero_after(None) {
            Some(index) => {
                Self::begin_hero_turn(state, index);
                Ok(())
            }
            None => self.end_round(state),
        }
    }

    fn advance_after_hero(&self, state: &mut CombatState, current: usize) -> Result<(), CombatError> {
        match state.next_hero_after(Some(current)) {
            Some(index) => {
                Self::begin_hero_turn(state, index);
                Ok(())
            }
            None => self.end_round(state),
        }
    }

    /// 回合边界：先结算中毒，再让状态持续时间减一，然后回到怪物。
    fn end_round(&self, state: &mut CombatState) -> Result<(), CombatError> {
        let poisons: Vec<(StatusTarget, i32)> = state
            .statuses
            .iter()
            .filter(|status| status.kind == StatusKind::Poison)
            .map(|status| (status.target, status.payload))
            .collect();
        for (target, payload) in poisons {
            let victim = match target {
                StatusTarget::Monster => Actor::Monster,
                StatusTarget::Hero { index } => Actor::Hero { index },
            };
            let alive = state.vitals(victim).map(|entity| !entity.is_fallen());
            if alive != Some(true) || payload <= 0 {
                continue;
            }
            let name = state.actor_name(victim);
            state.record(LogCategory::Status, format!("Poison courses through {name}"));
            damage::wound(state, victim, payload as u32);
            if state.is_finished() {
                return Ok(());
            }
        }

        for expired in state.tick_statuses() {
            let name = match expired.target {
                StatusTarget::Monster => state.monster.name.clone(),
                StatusTarget::Hero { index } => state.actor_name(Actor::Hero { index }),
            };
            state.record(
                LogCategory::Status,
                format!("{} on {name} wears off", expired.kind.label()),
            );
        }

        state.turn.round += 1;
        log::info!("round {} begins", state.turn.round);
        Self::begin_monster_turn(state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::cards::{Rank, Suit};
    use crate::game::entities::{MarkerKind, StatusEffect};
    use crate::game::rng::{ScriptedRng, SeededRng};
    use crate::game::testing::{sample_state, test_config};

    fn engine() -> CombatEngine {
        CombatEngine::new(test_config())
    }

    fn in_phase(phase: CombatPhase) -> CombatState {
        let mut state = sample_state().with_phase(phase);
        state.turn.direction = Some(TurnDirection::Right);
        state
    }

    fn autoplay_action(state: &CombatState) -> CombatAction {
        match state.phase {
            CombatPhase::ChooseTurnOrder => CombatAction::ChooseTurnOrder {
                direction: TurnDirection::Right,
            },
            CombatPhase::MonsterFlip | CombatPhase::HeroFlip => CombatAction::Flip,
            _ => CombatAction::Roll,
        }
    }

    #[test]
    fn start_deals_attached_cards_and_waits_for_turn_order() {
        let mut rng = SeededRng::seed_from_u64(11);
        let setup = CombatSetup::sample(&mut rng);
        let resolution = engine().start(setup, &mut rng).expect("combat should start");
        let state = resolution.state;

        assert_eq!(state.phase, CombatPhase::ChooseTurnOrder);
        assert!(state.environment.is_some());
        assert!(state
            .party
            .iter()
            .all(|hero| (2..=3).contains(&hero.attached_cards.len())));
        assert!((2..=3).contains(&state.monster.attached_cards.len()));
        assert_eq!(state.card_total, 38);
        assert!(!resolution.entries.is_empty());
    }

    #[test]
    fn an_empty_party_cannot_fight() {
        let mut rng = ScriptedRng::default();
        let mut setup = CombatSetup::sample(&mut rng);
        setup.party.clear();
        assert_eq!(
            engine().start(setup, &mut rng),
            Err(CombatError::EmptyParty)
        );
    }

    #[test]
    fn combat_start_is_an_ability_reset_point() {
        let mut rng = ScriptedRng::default();
        let mut setup = CombatSetup::sample(&mut rng);
        setup.party[0].consume_ability();
        setup.party[0].add_marker(MarkerKind::Marked);

        let state = engine().start(setup, &mut rng).expect("combat should start").state;

        assert!(state.party[0].ability_available());
        assert!(state.party[0].markers.is_empty());
    }

    #[test]
    fn monster_roll_of_three_hits_every_hero_once() {
        let state = in_phase(CombatPhase::MonsterRoll);
        let mut rng = ScriptedRng::new([3]);

        let resolution = engine()
            .next(&state, CombatAction::Roll, &mut rng)
            .expect("roll should resolve");

        let health: Vec<u32> = resolution.state.party.iter().map(|hero| hero.health).collect();
        assert_eq!(health, vec![15, 15, 12]);
        let damage_entries = resolution
            .entries
            .iter()
            .filter(|entry| entry.category == LogCategory::Damage)
            .count();
        assert_eq!(damage_entries, 3);
        assert_eq!(resolution.state.phase, CombatPhase::HeroFlip);
        assert_eq!(resolution.state.turn.actor, Actor::Hero { index: 0 });
    }

    #[test]
    fn turn_order_wraps_back_to_the_monster() {
        let engine = engine();
        let mut state = in_phase(CombatPhase::MonsterFlip);
        let mut rng = ScriptedRng::default();
        let mut actors = Vec::new();

        for _ in 0..10 {
            if matches!(state.phase, CombatPhase::MonsterFlip | CombatPhase::HeroFlip) {
                actors.push(state.turn.actor);
            }
            let action = autoplay_action(&state);
            state = engine.next(&state, action, &mut rng).expect("step should resolve").state;
        }

        assert_eq!(
            actors,
            vec![
                Actor::Monster,
                Actor::Hero { index: 0 },
                Actor::Hero { index: 1 },
                Actor::Hero { index: 2 },
                Actor::Monster,
            ]
        );
        assert_eq!(state.turn.round, 2);
    }

    #[test]
    fn left_order_runs_descending_and_skips_the_fallen() {
        let engine = engine();
        let mut state = in_phase(CombatPhase::MonsterRoll);
        state.turn.direction = Some(TurnDirection::Left);
        state.party[1].health = 0;
        let mut rng = ScriptedRng::new([1]);

        let state = engine
            .next(&state, CombatAction::Roll, &mut rng)
            .expect("roll should resolve")
            .state;
        assert_eq!(state.turn.actor, Actor::Hero { index: 2 });

        let mut state = state.with_phase(CombatPhase::HeroRoll);
        state.turn.actor = Actor::Hero { index: 2 };
        let mut rng = ScriptedRng::new([3]);
        let state = engine
            .next(&state, CombatAction::Roll, &mut rng)
            .expect("roll should resolve")
            .state;
        assert_eq!(state.turn.actor, Actor::Hero { index: 0 });
    }

    #[test]
    fn rolling_during_a_flip_phase_is_rejected_without_mutation() {
        let mut state = in_phase(CombatPhase::HeroFlip);
        state.turn.actor = Actor::Hero { index: 0 };
        let snapshot = state.clone();
        let mut rng = ScriptedRng::new([6]);

        let error = engine()
            .next(&state, CombatAction::Roll, &mut rng)
            .expect_err("roll must wait for the flip");

        assert_eq!(
            error,
            CombatError::WrongPhase {
                action: "roll".into(),
                actual: CombatPhase::HeroFlip,
            }
        );
        assert!(!error.is_fatal());
        assert_eq!(state, snapshot);
    }

    #[test]
    fn stale_steps_cannot_double_apply_a_roll() {
        let engine = engine();
        let state = in_phase(CombatPhase::MonsterRoll);
        let mut rng = ScriptedRng::new([3, 3]);

        let first = engine
            .next_checked(&state, 0, CombatAction::Roll, &mut rng)
            .expect("first roll should resolve");
        assert_eq!(first.state.step, 1);

        let duplicate = engine.next_checked(&first.state, 0, CombatAction::Roll, &mut rng);
        assert_eq!(
            duplicate,
            Err(CombatError::StaleStep {
                expected: 1,
                actual: 0
            })
        );
    }

    #[test]
    fn finished_combats_reject_further_actions() {
        let state = in_phase(CombatPhase::Victory);
        let mut rng = ScriptedRng::default();
        assert_eq!(
            engine().next(&state, CombatAction::Flip, &mut rng),
            Err(CombatError::CombatFinished)
        );
    }

    #[test]
    fn items_are_accepted_between_steps() {
        let mut state = in_phase(CombatPhase::HeroFlip);
        state.turn.actor = Actor::Hero { index: 0 };
        let mut rng = ScriptedRng::default();

        let resolution = engine()
            .next(
                &state,
                CombatAction::UseItem {
                    item: Item::BlockingScroll,
                    target: ItemTarget::Monster,
                },
                &mut rng,
            )
            .expect("item should apply");

        assert_eq!(resolution.state.phase, CombatPhase::HeroFlip);
        assert!(resolution
            .state
            .has_status(StatusKind::AbilityBlocked, StatusTarget::Monster));
    }

    #[test]
    fn poison_ticks_before_durations_decrement() {
        let engine = engine();
        let mut state = in_phase(CombatPhase::HeroRoll);
        state.turn.actor = Actor::Hero { index: 2 };
        state.statuses.push(StatusEffect::new(
            StatusKind::Poison,
            StatusTarget::Hero { index: 0 },
            1,
            2,
        ));
        let mut rng = ScriptedRng::new([2]);

        let state = engine
            .next(&state, CombatAction::Roll, &mut rng)
            .expect("roll should resolve")
            .state;

        assert_eq!(state.party[0].health, 15);
        assert!(state.statuses.is_empty(), "the poison expired after ticking");
        assert_eq!(state.turn.round, 2);
        assert_eq!(state.phase, CombatPhase::MonsterFlip);
    }

    #[test]
    fn armory_bonus_waits_for_a_hero_who_missed_round_one() {
        let engine = engine();
        let mut state = in_phase(CombatPhase::MonsterRoll);
        state.statuses.push(StatusEffect::new(
            StatusKind::FirstRollBonus,
            StatusTarget::Hero { index: 0 },
            StatusEffect::PERMANENT,
            2,
        ));
        state.party[0].health = 0;

        // 第一轮：怪物掷 1 落空，倒下的战士被跳过
        let mut rng = ScriptedRng::new([1]);
        let mut state = engine
            .next(&state, CombatAction::Roll, &mut rng)
            .expect("roll should resolve")
            .state;
        assert_eq!(state.turn.actor, Actor::Hero { index: 1 });

        state.party[0].health = 10;
        state.turn.round = 2;
        state.turn.actor = Actor::Hero { index: 0 };
        state.phase = CombatPhase::HeroRoll;
        let mut rng = ScriptedRng::new([1]);
        let state = engine
            .next(&state, CombatAction::Roll, &mut rng)
            .expect("roll should resolve")
            .state;

        assert_eq!(state.monster.health, 12 - 3, "1 + 2 is a 2 damage hit");
        assert!(!state.has_status(StatusKind::FirstRollBonus, StatusTarget::Hero { index: 0 }));
    }

    #[test]
    fn victory_concludes_the_combat_with_a_reward() {
        let mut state = in_phase(CombatPhase::HeroRoll);
        state.turn.actor = Actor::Hero { index: 2 };
        state.monster.health = 3;
        let card = Card::new(Rank::Eight, Suit::Clubs);
        state.piles.take_from_draw(|held| held.same_card(&card));
        state.monster.attached_cards.push(card.clone());
        let mut rng = ScriptedRng::new([5, 10]);

        let resolution = engine()
            .next(&state, CombatAction::Roll, &mut rng)
            .expect("roll should resolve");

        assert_eq!(resolution.outcome, Some(CombatOutcome::Victory));
        assert_eq!(resolution.reward.as_ref().map(|reward| reward.gold), Some(30));
        assert!(resolution.state.monster.attached_cards.is_empty());
        assert!(resolution
            .state
            .piles
            .discard
            .iter()
            .any(|held| held.same_card(&card)));
    }

    #[test]
    fn seeded_combats_conserve_cards_and_health_bounds() {
        let engine = engine();
        for seed in [1_u64, 7, 42, 1234, 9001] {
            let mut rng = SeededRng::seed_from_u64(seed);
            let setup = CombatSetup::sample(&mut rng);
            let mut state = engine.start(setup, &mut rng).expect("combat should start").state;

            for _ in 0..400 {
                if state.is_finished() {
                    break;
                }
                let action = autoplay_action(&state);
                state = engine
                    .next(&state, action, &mut rng)
                    .unwrap_or_else(|error| panic!("seed {seed} failed: {error}"))
                    .state;
                for hero in &state.party {
                    assert!(hero.health <= hero.max_health);
                }
                assert!(state.monster.health <= state.monster.max_health);
            }
            state.integrity_check().expect("cards are conserved");
        }
    }

    #[test]
    fn state_round_trips_through_json_mid_combat() {
        let engine = engine();
        let mut rng = SeededRng::seed_from_u64(5);
        let setup = CombatSetup::sample(&mut rng);
        let mut state = engine.start(setup, &mut rng).expect("combat should start").state;
        for _ in 0..6 {
            let action = autoplay_action(&state);
            state = engine.next(&state, action, &mut rng).expect("step should resolve").state;
            if state.is_finished() {
                break;
            }
        }

        let json = serde_json::to_string(&state).expect("state should serialize");
        let restored: CombatState = serde_json::from_str(&json).expect("state should deserialize");
        assert_eq!(restored, state);

        if !state.is_finished() {
            let action = autoplay_action(&state);
            let mut left = rng.clone();
            let mut right = rng;
            let from_live = engine.next(&state, action.clone(), &mut left);
            let from_restored = engine.next(&restored, action, &mut right);
            assert_eq!(from_live, from_restored);
        }
    }

    #[test]
    fn actions_serialize_as_tagged_json() {
        let action: CombatAction =
            serde_json::from_str(r#"{"type":"ChooseTurnOrder","direction":"Left"}"#)
                .expect("action should parse");
        assert_eq!(
            action,
            CombatAction::ChooseTurnOrder {
                direction: TurnDirection::Left
            }
        );
        let item: CombatAction = serde_json::from_str(
            r#"{"type":"UseItem","item":{"type":"HealthPotion"},"target":{"type":"Hero","index":1}}"#,
        )
        .expect("item action should parse");
        assert_eq!(item.name(), "useItem");
    }
}
