use serde::{Deserialize, Serialize};

use super::cards::{Card, CardColor, Rank, Suit};
use super::effects::{AbilityDefinition, AbilityUsage, EffectKind, RollTable};
use super::registry::{HeroClass, MonsterKind, Specialization};
use super::state::Actor;

/// 英雄与怪物共有的生命值与附属牌操作。上限由调用方负责检查。
pub trait Vitals {
    fn health(&self) -> u32;
    fn max_health(&self) -> u32;
    fn set_health(&mut self, health: u32);
    fn attached(&self) -> &[Card];
    fn attached_mut(&mut self) -> &mut Vec<Card>;

    /// 无条件扣血，返回实际扣除量。
    fn apply_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.health());
        self.set_health(self.health() - dealt);
        dealt
    }

    fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max_health().saturating_sub(self.health()));
        self.set_health(self.health() + healed);
        healed
    }

    fn is_fallen(&self) -> bool {
        self.health() == 0
    }

    fn is_below_half(&self) -> bool {
        self.health() * 2 < self.max_health()
    }

    fn attach_card(&mut self, card: Card) {
        self.attached_mut().push(card);
    }

    fn detach_card(&mut self, card: &Card) -> Option<Card> {
        let position = self
            .attached()
            .iter()
            .position(|attached| attached.same_card(card))?;
        Some(self.attached_mut().remove(position))
    }

    /// 翻开的牌与未横置附属牌点数相同的张数。
    fn count_matches(&self, flipped: &[Card]) -> usize {
        flipped
            .iter()
            .filter(|card| {
                self.attached()
                    .iter()
                    .any(|attached| !attached.tapped && card.matches_rank(attached.rank))
            })
            .count()
    }
}

/// 英雄身上的一次性标记，可重复持有。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Dodge,
    BonusRoll,
    Marked,
}

impl MarkerKind {
    pub fn label(self) -> &'static str {
        match self {
            MarkerKind::Dodge => "dodge",
            MarkerKind::BonusRoll => "bonus roll",
            MarkerKind::Marked => "marked",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StatusKind {
    RollBonus,
    FirstRollBonus,
    HuntersMark,
    Enrage,
    Thorns,
    Reflection,
    AbilityBlocked,
    Poison,
}

impl StatusKind {
    pub fn label(self) -> &'static str {
        match self {
            StatusKind::RollBonus => "roll bonus",
            StatusKind::FirstRollBonus => "first roll bonus",
            StatusKind::HuntersMark => "hunter's mark",
            StatusKind::Enrage => "enrage",
            StatusKind::Thorns => "thorns",
            StatusKind::Reflection => "reflection",
            StatusKind::AbilityBlocked => "ability block",
            StatusKind::Poison => "poison",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type")]
pub enum StatusTarget {
    Monster,
    Hero { index: usize },
}

impl From<Actor> for StatusTarget {
    fn from(actor: Actor) -> Self {
        match actor {
            Actor::Monster => StatusTarget::Monster,
            Actor::Hero { index } => StatusTarget::Hero { index },
        }
    }
}

/// 持续状态。`duration == -1` 表示持续到战斗结束。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub target: StatusTarget,
    pub duration: i32,
    #[serde(default)]
    pub payload: i32,
}

impl StatusEffect {
    pub const PERMANENT: i32 = -1;

    pub fn new(kind: StatusKind, target: StatusTarget, duration: i32, payload: i32) -> Self {
        Self {
            kind,
            target,
            duration,
            payload,
        }
    }

    pub fn is_permanent(&self) -> bool {
        self.duration < 0
    }

    pub fn label(&self) -> String {
        let span = if self.is_permanent() {
            "until the combat ends".to_string()
        } else {
            format!("for {} rounds", self.duration)
        };
        match self.kind {
            StatusKind::AbilityBlocked | StatusKind::Enrage | StatusKind::Reflection => {
                format!("{} {span}", self.kind.label())
            }
            _ => format!("{} {} {span}", self.kind.label(), self.payload),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Enchantment {
    Keen,
    Blessed,
    Gilded { gold: u32 },
}

impl Enchantment {
    /// 按截断后的点数给出额外伤害。
    pub fn bonus_damage(&self, clamped: u32) -> u32 {
        match self {
            Enchantment::Keen if (3..=4).contains(&clamped) => 2,
            Enchantment::Blessed if (1..=4).contains(&clamped) => 1,
            _ => 0,
        }
    }

    /// 镀金附魔在 6 点时产出金币并追加一次掷骰。
    pub fn gilded_payout(&self, clamped: u32) -> Option<u32> {
        match self {
            Enchantment::Gilded { gold } if clamped == 6 => Some(*gold),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Enchantment::Keen => "Keen".to_string(),
            Enchantment::Blessed => "Blessed".to_string(),
            Enchantment::Gilded { gold } => format!("Gilded ({gold} gold)"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Weapon {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enchantment: Option<Enchantment>,
}

impl Weapon {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enchantment: None,
        }
    }

    pub fn with_enchantment(mut self, enchantment: Enchantment) -> Self {
        self.enchantment = Some(enchantment);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hero {
    pub name: String,
    pub class: HeroClass,
    pub specialization: Specialization,
    pub health: u32,
    pub max_health: u32,
    pub class_card: Card,
    #[serde(default)]
    pub attached_cards: Vec<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon: Option<Weapon>,
    #[serde(default)]
    pub is_tapped: bool,
    #[serde(default)]
    pub markers: Vec<MarkerKind>,
    pub roll_effects: RollTable,
    pub ability: AbilityDefinition,
    pub match_damage: u32,
}

impl Hero {
    pub fn new(specialization: Specialization) -> Self {
        let class = specialization.class();
        let class_def = class.definition();
        let spec_def = specialization.definition();
        Self {
            name: spec_def.name.to_string(),
            class,
            specialization,
            health: class_def.max_health,
            max_health: class_def.max_health,
            class_card: Card::new(class_def.card_rank, class_def.card_suit),
            attached_cards: Vec::new(),
            weapon: None,
            is_tapped: false,
            markers: Vec::new(),
            roll_effects: class_def.roll_table.clone(),
            ability: spec_def.ability.clone(),
            match_damage: class_def.match_damage,
        }
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn with_health(mut self, health: u32) -> Self {
        self.health = health.min(self.max_health);
        self
    }

    pub fn color(&self) -> CardColor {
        self.class_card
            .suit
            .map(Suit::color)
            .unwrap_or(CardColor::Black)
    }

    /// 英雄造成的伤害按职业牌花色定性。
    pub fn damage_suit(&self) -> Option<Suit> {
        self.class_card.suit
    }

    pub fn class_rank(&self) -> Rank {
        self.class_card.rank
    }

    pub fn enchantment(&self) -> Option<Enchantment> {
        self.weapon.as_ref().and_then(|weapon| weapon.enchantment)
    }

    pub fn ability_available(&self) -> bool {
        match self.ability.usage {
            AbilityUsage::Reusable => true,
            AbilityUsage::OncePerCombat => !self.is_tapped,
        }
    }

    pub fn consume_ability(&mut self) {
        if self.ability.usage == AbilityUsage::OncePerCombat {
            self.is_tapped = true;
            self.class_card.tapped = true;
        }
    }

    /// 战斗开始时的重置点。
    pub fn reset_for_combat(&mut self) {
        self.is_tapped = false;
        self.class_card.tapped = false;
        self.markers.clear();
        for card in &mut self.attached_cards {
            card.tapped = false;
        }
    }

    /// 通关一层后的重置点：回满生命并解除横置。
    pub fn complete_tier(&mut self) {
        self.health = self.max_health;
        self.is_tapped = false;
        self.class_card.tapped = false;
    }

    pub fn has_marker(&self, marker: MarkerKind) -> bool {
        self.markers.contains(&marker)
    }

    pub fn add_marker(&mut self, marker: MarkerKind) {
        self.markers.push(marker);
    }

    /// 消耗一个标记；没有则返回 false。
    pub fn take_marker(&mut self, marker: MarkerKind) -> bool {
        match self.markers.iter().position(|held| *held == marker) {
            Some(position) => {
                self.markers.remove(position);
                true
            }
            None => false,
        }
    }
}

impl Vitals for Hero {
    fn health(&self) -> u32 {
        self.health
    }

    fn max_health(&self) -> u32 {
        self.max_health
    }

    fn set_health(&mut self, health: u32) {
        self.health = health;
    }

    fn attached(&self) -> &[Card] {
        &self.attached_cards
    }

    fn attached_mut(&mut self) -> &mut Vec<Card> {
        &mut self.attached_cards
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpecialTrigger {
    /// 翻开的牌与怪物未横置的附属牌点数相同。
    AttachedMatch,
    /// 同上，或者两张翻开的牌自成一对。
    MatchOrPair,
}

impl SpecialTrigger {
    pub fn is_met(self, flipped: &[Card], attached: &[Card]) -> bool {
        let attached_match = flipped.iter().any(|card| {
            attached
                .iter()
                .any(|held| !held.tapped && card.matches_rank(held.rank))
        });
        match self {
            SpecialTrigger::AttachedMatch => attached_match,
            SpecialTrigger::MatchOrPair => {
                let pair = match flipped {
                    [first, second] => first.matches_rank(second.rank),
                    _ => false,
                };
                attached_match || pair
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonsterSpecial {
    pub name: String,
    pub trigger: SpecialTrigger,
    pub effect: EffectKind,
}

impl MonsterSpecial {
    pub fn label(&self) -> String {
        format!("{}: {}", self.name, self.effect.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Monster {
    pub kind: MonsterKind,
    pub name: String,
    pub rank: Rank,
    pub health: u32,
    pub max_health: u32,
    #[serde(default)]
    pub attached_cards: Vec<Card>,
    pub attached_count: u8,
    pub match_damage: u32,
    pub special: MonsterSpecial,
    pub roll_effects: RollTable,
    pub min_gold: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gold_multiplier: Option<u32>,
    #[serde(default)]
    pub vulnerabilities: Vec<Suit>,
    #[serde(default)]
    pub resistances: Vec<Suit>,
}

impl Monster {
    pub fn new(kind: MonsterKind) -> Self {
        let def = kind.definition();
        Self {
            kind,
            name: def.name.to_string(),
            rank: def.rank,
            health: def.max_health,
            max_health: def.max_health,
            attached_cards: Vec::new(),
            attached_count: def.attached_count,
            match_damage: def.match_damage,
            special: def.special.clone(),
            roll_effects: def.roll_table.clone(),
            min_gold: def.min_gold,
            gold_multiplier: def.gold_multiplier,
            vulnerabilities: def.vulnerabilities.clone(),
            resistances: def.resistances.clone(),
        }
    }

    /// 易伤 +1，抗性 -1（不低于 0）。
    pub fn adjust_for_suit(&self, amount: u32, suit: Option<Suit>) -> u32 {
        let Some(suit) = suit else {
            return amount;
        };
        if amount == 0 {
            return 0;
        }
        let mut adjusted = amount;
        if self.vulnerabilities.contains(&suit) {
            adjusted += 1;
        }
        if self.resistances.contains(&suit) {
            adjusted = adjusted.saturating_sub(1);
        }
        adjusted
    }

    pub fn special_triggered(&self, flipped: &[Card]) -> bool {
        self.special.trigger.is_met(flipped, &self.attached_cards)
    }

    /// 环境效果提升生命上限，不超过 `cap`。
    pub fn fortify(&mut self, amount: u32, cap: u32) -> u32 {
        let raised = (self.max_health + amount).min(cap.max(self.max_health));
        let gained = raised - self.max_health;
        self.max_health = raised;
        self.health = (self.health + gained).min(self.max_health);
        gained
    }
}

impl Vitals for Monster {
    fn health(&self) -> u32 {
        self.health
    }

    fn max_health(&self) -> u32 {
        self.max_health
    }

    fn set_health(&mut self, health: u32) {
        self.health = health;
    }

    fn attached(&self) -> &[Card] {
        &self.attached_cards
    }

    fn attached_mut(&mut self) -> &mut Vec<Card> {
        &mut self.attached_cards
    }
}
