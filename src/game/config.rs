use serde::{Deserialize, Serialize};

/// 引擎可调参数。游戏内容数据（职业、怪物）不在这里。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub roll_die_sides: u32,
    pub roll_table_size: u32,
    pub dodge_threshold: u32,
    pub hero_starting_attached: u8,
    pub hero_attached_cap: u8,
    pub monster_attached_cap: u8,
    pub monster_health_cap: u32,
    pub max_redeal_attempts: u32,
    pub redeal_after_environment_draws: bool,
    pub max_roll_chain: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            roll_die_sides: 20,
            roll_table_size: 6,
            dodge_threshold: 2,
            hero_starting_attached: 2,
            hero_attached_cap: 3,
            monster_attached_cap: 4,
            monster_health_cap: 20,
            max_redeal_attempts: 16,
            redeal_after_environment_draws: false,
            max_roll_chain: 3,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_dodge_threshold(mut self, threshold: u32) -> Self {
        self.dodge_threshold = threshold;
        self
    }

    pub fn with_redeal_after_environment_draws(mut self, enabled: bool) -> Self {
        self.redeal_after_environment_draws = enabled;
        self
    }

    pub fn with_max_redeal_attempts(mut self, attempts: u32) -> Self {
        self.max_redeal_attempts = attempts;
        self
    }

    pub fn with_max_roll_chain(mut self, chain: u32) -> Self {
        self.max_roll_chain = chain;
        self
    }

    /// 截断到效果表下标范围 1..=N。
    pub fn clamp_roll(&self, raw: i64) -> u32 {
        raw.clamp(1, i64::from(self.roll_table_size.max(1))) as u32
    }
}
