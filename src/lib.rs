pub mod game;

use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

pub use game::{
    Actor, Card, CombatAction, CombatEngine, CombatError, CombatOutcome, CombatPhase,
    CombatResolution, CombatRng, CombatSetup, CombatState, Difficulty, EngineConfig, Hero,
    IntegrityError, Item, ItemTarget, LogCategory, LogEntry, Monster, MonsterKind, Reward,
    ScriptedRng, SeededRng, Specialization, TurnDirection,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
    init_logger();
}

#[wasm_bindgen]
pub fn greet(name: &str) -> String {
    let message = format!("你好，{name}! 天梯战斗引擎已就绪。");
    web_sys::console::log_1(&message.clone().into());
    message
}

/// 宿主不给种子时用系统熵源。
fn make_rng(seed: Option<u32>) -> SeededRng {
    match seed {
        Some(seed) => SeededRng::seed_from_u64(u64::from(seed)),
        None => SeededRng::from_entropy(),
    }
}

fn make_engine(config: Option<String>) -> Result<CombatEngine, JsValue> {
    let config = match config {
        Some(json) => EngineConfig::from_json(&json).map_err(serde_to_js_error)?,
        None => EngineConfig::default(),
    };
    Ok(CombatEngine::new(config))
}

fn to_js_error(error: CombatError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn make_resolution_json(resolution: &CombatResolution) -> Result<String, JsValue> {
    serde_json::to_string(resolution).map_err(serde_to_js_error)
}

#[derive(Serialize)]
struct SessionSnapshot<'a> {
    state: &'a CombatState,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<CombatOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reward: Option<&'a Reward>,
}

/// 持有状态的战斗会话，供只想收发 JSON 的宿主使用。
#[wasm_bindgen]
pub struct CombatSession {
    engine: CombatEngine,
    state: CombatState,
    rng: SeededRng,
}

#[wasm_bindgen]
impl CombatSession {
    #[wasm_bindgen(constructor)]
    pub fn new(
        setup_json: Option<String>,
        seed: Option<u32>,
        config_json: Option<String>,
    ) -> Result<CombatSession, JsValue> {
        let engine = make_engine(config_json)?;
        let mut rng = make_rng(seed);
        let setup = match setup_json {
            Some(json) => serde_json::from_str(&json).map_err(serde_to_js_error)?,
            None => CombatSetup::sample(&mut rng),
        };
        let resolution = engine.start(setup, &mut rng).map_err(to_js_error)?;
        Ok(CombatSession {
            engine,
            state: resolution.state,
            rng,
        })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state: CombatState = serde_json::from_str(json).map_err(serde_to_js_error)?;
        state
            .integrity_check()
            .map_err(|error| to_js_error(CombatError::IntegrityViolation { error }))?;
        self.state = state;
        Ok(())
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        let snapshot = SessionSnapshot {
            state: &self.state,
            outcome: self.state.outcome(),
            reward: self.state.reward.as_ref(),
        };
        serde_json::to_string(&snapshot).map_err(serde_to_js_error)
    }

    pub fn step(&self) -> f64 {
        self.state.step as f64
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// 应用一个动作。失败时会话状态保持不变。
    pub fn next_json(&mut self, action_json: &str) -> Result<String, JsValue> {
        let action: CombatAction = serde_json::from_str(action_json).map_err(serde_to_js_error)?;
        let resolution = self
            .engine
            .next(&self.state, action, &mut self.rng)
            .map_err(to_js_error)?;
        self.state = resolution.state.clone();
        make_resolution_json(&resolution)
    }

    /// 带步数校验的版本，用于拒绝 UI 重复提交的事件。
    pub fn next_checked_json(
        &mut self,
        expected_step: u32,
        action_json: &str,
    ) -> Result<String, JsValue> {
        let action: CombatAction = serde_json::from_str(action_json).map_err(serde_to_js_error)?;
        let resolution = self
            .engine
            .next_checked(&self.state, u64::from(expected_step), action, &mut self.rng)
            .map_err(to_js_error)?;
        self.state = resolution.state.clone();
        make_resolution_json(&resolution)
    }
}

#[wasm_bindgen(js_name = "defaultConfig")]
pub fn default_config() -> Result<JsValue, JsValue> {
    to_value(&EngineConfig::default()).map_err(JsValue::from)
}

/// 示例开局：三名英雄对阵哥布林，牌堆按种子洗好。
#[wasm_bindgen(js_name = "createSampleSetup")]
pub fn create_sample_setup(seed: Option<u32>) -> Result<JsValue, JsValue> {
    let mut rng = make_rng(seed);
    to_value(&CombatSetup::sample(&mut rng)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "createSetup")]
pub fn create_setup(
    party: JsValue,
    monster: JsValue,
    difficulty: JsValue,
    seed: Option<u32>,
) -> Result<JsValue, JsValue> {
    let party: Vec<Specialization> = from_value(party).map_err(JsValue::from)?;
    let monster: MonsterKind = from_value(monster).map_err(JsValue::from)?;
    let difficulty: Difficulty = if difficulty.is_undefined() || difficulty.is_null() {
        Difficulty::default()
    } else {
        from_value(difficulty).map_err(JsValue::from)?
    };
    let mut rng = make_rng(seed);
    let setup = CombatSetup::new(
        party.into_iter().map(Hero::new).collect(),
        Monster::new(monster),
        difficulty,
        &mut rng,
    );
    to_value(&setup).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "startCombat")]
pub fn start_combat(
    setup: JsValue,
    seed: Option<u32>,
    config: Option<String>,
) -> Result<JsValue, JsValue> {
    let setup: CombatSetup = from_value(setup).map_err(JsValue::from)?;
    let engine = make_engine(config)?;
    let mut rng = make_rng(seed);
    match engine.start(setup, &mut rng) {
        Ok(resolution) => to_value(&resolution).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

/// 纯函数式的单步结算：输入状态不会被修改。
#[wasm_bindgen(js_name = "nextStep")]
pub fn next_step(
    state: JsValue,
    action: JsValue,
    seed: Option<u32>,
    config: Option<String>,
) -> Result<JsValue, JsValue> {
    let state: CombatState = from_value(state).map_err(JsValue::from)?;
    let action: CombatAction = from_value(action).map_err(JsValue::from)?;
    let engine = make_engine(config)?;
    let mut rng = make_rng(seed);
    match engine.next(&state, action, &mut rng) {
        Ok(resolution) => to_value(&resolution).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "nextStepChecked")]
pub fn next_step_checked(
    state: JsValue,
    expected_step: u32,
    action: JsValue,
    seed: Option<u32>,
    config: Option<String>,
) -> Result<JsValue, JsValue> {
    let state: CombatState = from_value(state).map_err(JsValue::from)?;
    let action: CombatAction = from_value(action).map_err(JsValue::from)?;
    let engine = make_engine(config)?;
    let mut rng = make_rng(seed);
    match engine.next_checked(&state, u64::from(expected_step), action, &mut rng) {
        Ok(resolution) => to_value(&resolution).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "validateState")]
pub fn validate_state(state: JsValue) -> Result<(), JsValue> {
    let state: CombatState = from_value(state).map_err(JsValue::from)?;
    state
        .integrity_check()
        .map_err(|error| to_js_error(CombatError::IntegrityViolation { error }))?;
    Ok(())
}

/// 通关一层后的重置点：英雄回满生命并解除横置。
#[wasm_bindgen(js_name = "completeTier")]
pub fn complete_tier(party: JsValue) -> Result<JsValue, JsValue> {
    let mut party: Vec<Hero> = from_value(party).map_err(JsValue::from)?;
    for hero in &mut party {
        hero.complete_tier();
    }
    to_value(&party).map_err(JsValue::from)
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}

#[cfg(feature = "console_log")]
fn init_logger() {
    if console_log::init_with_level(log::Level::Debug).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
}

#[cfg(not(feature = "console_log"))]
fn init_logger() {}
