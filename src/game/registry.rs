//! 职业、专精与怪物的静态数据表。新增内容只需在这里加一条记录。

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::cards::{Rank, Suit};
use super::effects::{
    AbilityDefinition, AbilityUsage, EffectCondition, EffectKind, EffectTarget, RollTable,
};
use super::entities::{MarkerKind, MonsterSpecial, SpecialTrigger, StatusKind};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HeroClass {
    Warrior,
    Ranger,
    Mage,
    Cleric,
    Rogue,
}

impl HeroClass {
    pub const ALL: [HeroClass; 5] = [
        HeroClass::Warrior,
        HeroClass::Ranger,
        HeroClass::Mage,
        HeroClass::Cleric,
        HeroClass::Rogue,
    ];

    pub fn definition(self) -> &'static ClassDefinition {
        &CLASSES[self as usize]
    }

    pub fn specializations(self) -> [Specialization; 2] {
        match self {
            HeroClass::Warrior => [Specialization::Berserker, Specialization::Guardian],
            HeroClass::Ranger => [Specialization::Hunter, Specialization::Beastmaster],
            HeroClass::Mage => [Specialization::Arcanist, Specialization::Pyromancer],
            HeroClass::Cleric => [Specialization::Priest, Specialization::Templar],
            HeroClass::Rogue => [Specialization::Assassin, Specialization::Trickster],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Specialization {
    Berserker,
    Guardian,
    Hunter,
    Beastmaster,
    Arcanist,
    Pyromancer,
    Priest,
    Templar,
    Assassin,
    Trickster,
}

impl Specialization {
    pub const ALL: [Specialization; 10] = [
        Specialization::Berserker,
        Specialization::Guardian,
        Specialization::Hunter,
        Specialization::Beastmaster,
        Specialization::Arcanist,
        Specialization::Pyromancer,
        Specialization::Priest,
        Specialization::Templar,
        Specialization::Assassin,
        Specialization::Trickster,
    ];

    pub fn class(self) -> HeroClass {
        match self {
            Specialization::Berserker | Specialization::Guardian => HeroClass::Warrior,
            Specialization::Hunter | Specialization::Beastmaster => HeroClass::Ranger,
            Specialization::Arcanist | Specialization::Pyromancer => HeroClass::Mage,
            Specialization::Priest | Specialization::Templar => HeroClass::Cleric,
            Specialization::Assassin | Specialization::Trickster => HeroClass::Rogue,
        }
    }

    pub fn definition(self) -> &'static SpecializationDefinition {
        &SPECIALIZATIONS[self as usize]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MonsterKind {
    GoblinRaider,
    CaveTroll,
    BoneLich,
    GildedMimic,
}

impl MonsterKind {
    pub const ALL: [MonsterKind; 4] = [
        MonsterKind::GoblinRaider,
        MonsterKind::CaveTroll,
        MonsterKind::BoneLich,
        MonsterKind::GildedMimic,
    ];

    pub fn definition(self) -> &'static MonsterDefinition {
        &MONSTERS[self as usize]
    }
}

#[derive(Debug, Clone)]
pub struct ClassDefinition {
    pub class: HeroClass,
    pub name: &'static str,
    pub card_rank: Rank,
    pub card_suit: Suit,
    pub max_health: u32,
    pub match_damage: u32,
    pub roll_table: RollTable,
}

#[derive(Debug, Clone)]
pub struct SpecializationDefinition {
    pub specialization: Specialization,
    pub name: &'static str,
    pub ability: AbilityDefinition,
}

#[derive(Debug, Clone)]
pub struct MonsterDefinition {
    pub kind: MonsterKind,
    pub name: &'static str,
    pub rank: Rank,
    pub max_health: u32,
    pub attached_count: u8,
    pub match_damage: u32,
    pub special: MonsterSpecial,
    pub roll_table: RollTable,
    pub min_gold: u32,
    pub gold_multiplier: Option<u32>,
    pub vulnerabilities: Vec<Suit>,
    pub resistances: Vec<Suit>,
}

fn hit(amount: u32) -> EffectKind {
    EffectKind::damage(amount, EffectTarget::Monster)
}

fn strike(amount: u32) -> EffectKind {
    EffectKind::damage(amount, EffectTarget::Opponent)
}

fn heal_self(amount: u32) -> EffectKind {
    EffectKind::heal(amount, EffectTarget::Actor)
}

fn self_status(status: StatusKind, rounds: i32, payload: i32) -> EffectKind {
    EffectKind::status(status, rounds, payload, EffectTarget::Actor)
}

static CLASSES: Lazy<Vec<ClassDefinition>> = Lazy::new(|| {
    vec![
        ClassDefinition {
            class: HeroClass::Warrior,
            name: "Warrior",
            card_rank: Rank::Ten,
            card_suit: Suit::Spades,
            max_health: 17,
            match_damage: 2,
            roll_table: RollTable::new([
                EffectKind::damage(1, EffectTarget::Actor),
                hit(1),
                hit(2),
                hit(3),
                hit(4),
                EffectKind::all(vec![
                    hit(4),
                    EffectKind::marker(MarkerKind::BonusRoll, EffectTarget::Actor),
                ]),
            ]),
        },
        ClassDefinition {
            class: HeroClass::Ranger,
            name: "Ranger",
            card_rank: Rank::Nine,
            card_suit: Suit::Clubs,
            max_health: 17,
            match_damage: 2,
            roll_table: RollTable::new([
                EffectKind::Nothing,
                hit(1),
                hit(2),
                EffectKind::all(vec![
                    hit(2),
                    EffectKind::marker(MarkerKind::BonusRoll, EffectTarget::Actor),
                ]),
                hit(3),
                EffectKind::all(vec![hit(3), EffectKind::RollAgain]),
            ]),
        },
        ClassDefinition {
            class: HeroClass::Mage,
            name: "Mage",
            card_rank: Rank::Seven,
            card_suit: Suit::Diamonds,
            max_health: 14,
            match_damage: 3,
            roll_table: RollTable::new([
                EffectKind::damage(2, EffectTarget::Actor),
                hit(1),
                hit(3),
                EffectKind::when(EffectCondition::MonsterBelowHalf, hit(5), hit(3)),
                hit(4),
                EffectKind::all(vec![
                    hit(4),
                    EffectKind::TapAttached {
                        count: 1,
                        target: EffectTarget::Monster,
                    },
                ]),
            ]),
        },
        ClassDefinition {
            class: HeroClass::Cleric,
            name: "Cleric",
            card_rank: Rank::Five,
            card_suit: Suit::Hearts,
            max_health: 15,
            match_damage: 1,
            roll_table: RollTable::new([
                heal_self(1),
                hit(1),
                EffectKind::heal(3, EffectTarget::LowestHealthHero),
                hit(2),
                EffectKind::heal(2, EffectTarget::Party),
                EffectKind::all(vec![hit(3), EffectKind::heal(1, EffectTarget::Party)]),
            ]),
        },
        ClassDefinition {
            class: HeroClass::Rogue,
            name: "Rogue",
            card_rank: Rank::Three,
            card_suit: Suit::Spades,
            max_health: 14,
            match_damage: 2,
            roll_table: RollTable::new([
                EffectKind::Nothing,
                hit(2),
                EffectKind::marker(MarkerKind::Dodge, EffectTarget::Actor),
                hit(3),
                EffectKind::AttachCards {
                    count: 1,
                    cap: 3,
                    target: EffectTarget::Actor,
                },
                hit(5),
            ]),
        },
    ]
});

fn entry(
    specialization: Specialization,
    name: &'static str,
    ability_name: &str,
    usage: AbilityUsage,
    effect: EffectKind,
) -> SpecializationDefinition {
    SpecializationDefinition {
        specialization,
        name,
        ability: AbilityDefinition::new(ability_name, usage, effect),
    }
}

static SPECIALIZATIONS: Lazy<Vec<SpecializationDefinition>> = Lazy::new(|| {
    use AbilityUsage::{OncePerCombat, Reusable};

    vec![
        entry(
            Specialization::Berserker,
            "Berserker",
            "Rampage",
            OncePerCombat,
            EffectKind::all(vec![hit(4), self_status(StatusKind::Enrage, 2, 0)]),
        ),
        entry(
            Specialization::Guardian,
            "Guardian",
            "Shield Wall",
            OncePerCombat,
            EffectKind::marker(MarkerKind::Dodge, EffectTarget::Party),
        ),
        entry(
            Specialization::Hunter,
            "Hunter",
            "Hunter's Mark",
            OncePerCombat,
            EffectKind::status(StatusKind::HuntersMark, 3, 1, EffectTarget::Monster),
        ),
        entry(
            Specialization::Beastmaster,
            "Beastmaster",
            "Companion Strike",
            OncePerCombat,
            EffectKind::all(vec![
                hit(3),
                EffectKind::marker(MarkerKind::BonusRoll, EffectTarget::Actor),
            ]),
        ),
        entry(
            Specialization::Arcanist,
            "Arcanist",
            "Arcane Seal",
            OncePerCombat,
            EffectKind::all(vec![
                hit(2),
                EffectKind::status(StatusKind::AbilityBlocked, -1, 0, EffectTarget::Monster),
            ]),
        ),
        entry(
            Specialization::Pyromancer,
            "Pyromancer",
            "Flame Burst",
            OncePerCombat,
            hit(5),
        ),
        entry(
            Specialization::Priest,
            "Priest",
            "Sanctuary",
            Reusable,
            EffectKind::heal(3, EffectTarget::Party),
        ),
        entry(
            Specialization::Templar,
            "Templar",
            "Smite",
            Reusable,
            EffectKind::all(vec![hit(3), heal_self(2)]),
        ),
        entry(
            Specialization::Assassin,
            "Assassin",
            "Backstab",
            OncePerCombat,
            hit(6),
        ),
        entry(
            Specialization::Trickster,
            "Trickster",
            "Smoke Screen",
            Reusable,
            EffectKind::all(vec![
                EffectKind::marker(MarkerKind::Dodge, EffectTarget::Actor),
                self_status(StatusKind::Thorns, 2, 1),
            ]),
        ),
    ]
});

static MONSTERS: Lazy<Vec<MonsterDefinition>> = Lazy::new(|| {
    vec![
        MonsterDefinition {
            kind: MonsterKind::GoblinRaider,
            name: "Goblin Raider",
            rank: Rank::Jack,
            max_health: 12,
            attached_count: 2,
            match_damage: 1,
            special: MonsterSpecial {
                name: "Cutpurse".to_string(),
                trigger: SpecialTrigger::AttachedMatch,
                effect: EffectKind::damage(2, EffectTarget::RandomHeroes { count: 1 }),
            },
            roll_table: RollTable::new([
                EffectKind::Nothing,
                strike(1),
                EffectKind::damage(2, EffectTarget::Party),
                strike(3),
                EffectKind::damage(2, EffectTarget::RandomHeroes { count: 2 }),
                EffectKind::all(vec![strike(3), heal_self(2)]),
            ]),
            min_gold: 10,
            gold_multiplier: Some(3),
            vulnerabilities: vec![Suit::Spades],
            resistances: Vec::new(),
        },
        MonsterDefinition {
            kind: MonsterKind::CaveTroll,
            name: "Cave Troll",
            rank: Rank::Queen,
            max_health: 16,
            attached_count: 2,
            match_damage: 2,
            special: MonsterSpecial {
                name: "Regenerate".to_string(),
                trigger: SpecialTrigger::MatchOrPair,
                effect: EffectKind::all(vec![heal_self(4), self_status(StatusKind::Thorns, 2, 1)]),
            },
            roll_table: RollTable::new([
                heal_self(2),
                strike(2),
                strike(3),
                EffectKind::damage(2, EffectTarget::Party),
                strike(4),
                EffectKind::all(vec![
                    EffectKind::damage(3, EffectTarget::Party),
                    self_status(StatusKind::Enrage, 2, 0),
                ]),
            ]),
            min_gold: 20,
            gold_multiplier: Some(5),
            vulnerabilities: vec![Suit::Diamonds],
            resistances: vec![Suit::Clubs],
        },
        MonsterDefinition {
            kind: MonsterKind::BoneLich,
            name: "Bone Lich",
            rank: Rank::King,
            max_health: 18,
            attached_count: 3,
            match_damage: 2,
            special: MonsterSpecial {
                name: "Soul Mirror".to_string(),
                trigger: SpecialTrigger::AttachedMatch,
                effect: EffectKind::all(vec![
                    self_status(StatusKind::Reflection, 2, 0),
                    EffectKind::damage(2, EffectTarget::Party),
                ]),
            },
            roll_table: RollTable::new([
                EffectKind::status(
                    StatusKind::Poison,
                    2,
                    1,
                    EffectTarget::RandomHeroes { count: 1 },
                ),
                strike(2),
                EffectKind::all(vec![EffectKind::damage(1, EffectTarget::Party), heal_self(1)]),
                EffectKind::damage(3, EffectTarget::RandomHeroes { count: 2 }),
                EffectKind::when(EffectCondition::ActorBelowHalf, heal_self(4), strike(4)),
                EffectKind::damage(3, EffectTarget::Party),
            ]),
            min_gold: 25,
            gold_multiplier: Some(7),
            vulnerabilities: vec![Suit::Hearts],
            resistances: vec![Suit::Spades],
        },
        MonsterDefinition {
            kind: MonsterKind::GildedMimic,
            name: "Gilded Mimic",
            rank: Rank::Ace,
            max_health: 10,
            attached_count: 2,
            match_damage: 1,
            special: MonsterSpecial {
                name: "Snap".to_string(),
                trigger: SpecialTrigger::MatchOrPair,
                effect: EffectKind::all(vec![
                    strike(3),
                    EffectKind::marker(MarkerKind::Marked, EffectTarget::LowestHealthHero),
                ]),
            },
            roll_table: RollTable::new([
                EffectKind::Nothing,
                strike(2),
                EffectKind::marker(MarkerKind::Marked, EffectTarget::LowestHealthHero),
                strike(3),
                EffectKind::damage(2, EffectTarget::Party),
                EffectKind::all(vec![strike(4), EffectKind::RollAgain]),
            ]),
            min_gold: 30,
            gold_multiplier: None,
            vulnerabilities: vec![Suit::Clubs],
            resistances: vec![Suit::Diamonds],
        },
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_indexed_by_their_tags() {
        for class in HeroClass::ALL {
            assert_eq!(class.definition().class, class);
        }
        for specialization in Specialization::ALL {
            assert_eq!(specialization.definition().specialization, specialization);
            assert!(specialization
                .class()
                .specializations()
                .contains(&specialization));
        }
        for kind in MonsterKind::ALL {
            assert_eq!(kind.definition().kind, kind);
        }
    }

    #[test]
    fn every_roll_table_has_six_entries() {
        for class in HeroClass::ALL {
            assert_eq!(class.definition().roll_table.len(), 6, "{class:?}");
        }
        for kind in MonsterKind::ALL {
            assert_eq!(kind.definition().roll_table.len(), 6, "{kind:?}");
        }
    }

    #[test]
    fn class_cards_are_peon_cards() {
        for class in HeroClass::ALL {
            assert!(class.definition().card_rank.is_peon());
        }
    }

    #[test]
    fn goblin_raider_hits_the_party_on_a_three() {
        let table = &MonsterKind::GoblinRaider.definition().roll_table;
        assert_eq!(
            table.entry(3).map(EffectKind::label).as_deref(),
            Some("Deal 2 damage to the party")
        );
    }
}
