use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::IntegrityError;
use super::rng::CombatRng;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Joker,
}

impl Rank {
    /// 小兵牌堆使用的点数（2–10）。
    pub const PEON: [Rank; 9] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
    ];

    /// 皇室牌堆使用的点数。
    pub const ROYALTY: [Rank; 4] = [Rank::Jack, Rank::Queen, Rank::King, Rank::Ace];

    pub fn is_peon(self) -> bool {
        Self::PEON.contains(&self)
    }

    pub fn label(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Joker => "Joker",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn color(self) -> CardColor {
        match self {
            Suit::Clubs | Suit::Spades => CardColor::Black,
            Suit::Diamonds | Suit::Hearts => CardColor::Red,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Clubs => "♣",
            Suit::Diamonds => "♦",
            Suit::Hearts => "♥",
            Suit::Spades => "♠",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CardColor {
    Black,
    Red,
}

/// 一张实体卡牌。除 `tapped` 外均不可变。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub rank: Rank,
    pub suit: Option<Suit>,
    #[serde(default)]
    pub tapped: bool,
    #[serde(default)]
    pub is_joker: bool,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self {
            rank,
            suit: Some(suit),
            tapped: false,
            is_joker: false,
        }
    }

    pub fn joker() -> Self {
        Self {
            rank: Rank::Joker,
            suit: None,
            tapped: false,
            is_joker: true,
        }
    }

    /// Jokers are blanks: they never match anything.
    pub fn matches_rank(&self, rank: Rank) -> bool {
        !self.is_joker && rank != Rank::Joker && self.rank == rank
    }

    /// 同一张牌（忽略横置状态）。
    pub fn same_card(&self, other: &Card) -> bool {
        self.rank == other.rank && self.suit == other.suit && self.is_joker == other.is_joker
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suit {
            Some(suit) if !self.is_joker => write!(f, "{}{}", self.rank.label(), suit.symbol()),
            _ => write!(f, "Joker"),
        }
    }
}

pub fn standard_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(54);
    for suit in Suit::ALL {
        for rank in Rank::PEON.iter().chain(Rank::ROYALTY.iter()) {
            deck.push(Card::new(*rank, suit));
        }
    }
    deck.push(Card::joker());
    deck.push(Card::joker());
    deck
}

pub fn peon_deck() -> Vec<Card> {
    standard_deck()
        .into_iter()
        .filter(|card| card.is_joker || card.rank.is_peon())
        .collect()
}

pub fn royalty_deck() -> Vec<Card> {
    standard_deck()
        .into_iter()
        .filter(|card| !card.is_joker && !card.rank.is_peon())
        .collect()
}

/// 默认的环境牌堆：每种花色一张 A。
pub fn environment_pile() -> Vec<Card> {
    Suit::ALL
        .iter()
        .map(|suit| Card::new(Rank::Ace, *suit))
        .collect()
}

/// 抽牌堆与弃牌堆。抽牌堆的顶端是 `draw` 的末尾。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Piles {
    #[serde(default)]
    pub draw: Vec<Card>,
    #[serde(default)]
    pub discard: Vec<Card>,
}

impl Piles {
    pub fn new(draw: Vec<Card>, discard: Vec<Card>) -> Self {
        Self { draw, discard }
    }

    pub fn len(&self) -> usize {
        self.draw.len() + self.discard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draw.is_empty() && self.discard.is_empty()
    }

    /// 抽一张牌；抽牌堆为空时先把弃牌堆洗回。两者皆空属于记账错误。
    pub fn draw<R: CombatRng>(&mut self, rng: &mut R) -> Result<Card, IntegrityError> {
        if self.draw.is_empty() {
            if self.discard.is_empty() {
                return Err(IntegrityError::PilesExhausted);
            }
            self.reshuffle(rng);
        }
        self.draw.pop().ok_or(IntegrityError::PilesExhausted)
    }

    pub fn discard(&mut self, mut card: Card) {
        card.tapped = false;
        self.discard.push(card);
    }

    fn shuffle<R: CombatRng>(&mut self, rng: &mut R) {
        rng.shuffle(&mut self.draw);
    }

    fn reshuffle<R: CombatRng>(&mut self, rng: &mut R) {
        log::debug!("reshuffling {} discarded cards into the draw pile", self.discard.len());
        self.draw.append(&mut self.discard);
        self.shuffle(rng);
    }

    /// 把牌放回抽牌堆并重新洗牌。
    pub fn return_to_draw<R: CombatRng>(&mut self, cards: Vec<Card>, rng: &mut R) {
        for mut card in cards {
            card.tapped = false;
            self.draw.push(card);
        }
        self.shuffle(rng);
    }

    /// 从牌堆顶向下找第一张满足条件的牌并取出。
    pub fn take_from_draw(&mut self, predicate: impl Fn(&Card) -> bool) -> Option<Card> {
        let position = self.draw.iter().rposition(|card| predicate(card))?;
        Some(self.draw.remove(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rng::{ScriptedRng, SeededRng};

    #[test]
    fn decks_have_expected_sizes() {
        assert_eq!(standard_deck().len(), 54);
        assert_eq!(peon_deck().len(), 38);
        assert_eq!(royalty_deck().len(), 16);
        assert_eq!(environment_pile().len(), 4);
        assert_eq!(
            peon_deck().iter().filter(|card| card.is_joker).count(),
            2,
            "both jokers belong to the peon pile"
        );
    }

    #[test]
    fn jokers_never_match() {
        let joker = Card::joker();
        assert!(!joker.matches_rank(Rank::Joker));
        assert!(!joker.matches_rank(Rank::Seven));
        assert!(Card::new(Rank::Seven, Suit::Hearts).matches_rank(Rank::Seven));
        assert!(!Card::new(Rank::Seven, Suit::Hearts).matches_rank(Rank::Joker));
    }

    #[test]
    fn draw_takes_from_the_top() {
        let mut rng = ScriptedRng::default();
        let mut piles = Piles::new(
            vec![Card::new(Rank::Two, Suit::Clubs), Card::new(Rank::Nine, Suit::Hearts)],
            Vec::new(),
        );

        let card = piles.draw(&mut rng).expect("draw should succeed");
        assert_eq!(card, Card::new(Rank::Nine, Suit::Hearts));
        assert_eq!(piles.draw.len(), 1);
    }

    #[test]
    fn empty_draw_pile_reshuffles_the_discard() {
        let mut rng = ScriptedRng::default();
        let discard = vec![
            Card::new(Rank::Two, Suit::Clubs),
            Card::new(Rank::Three, Suit::Clubs),
            Card::new(Rank::Four, Suit::Clubs),
        ];
        let mut piles = Piles::new(Vec::new(), discard.clone());

        let card = piles.draw(&mut rng).expect("reshuffle should refill the pile");

        assert!(piles.discard.is_empty(), "discard must be cleared");
        assert_eq!(card, discard[2]);
        assert_eq!(piles.draw, discard[..2].to_vec());
    }

    #[test]
    fn reshuffle_keeps_the_former_discard_multiset() {
        let mut rng = SeededRng::seed_from_u64(3);
        let discard = peon_deck();
        let mut piles = Piles::new(Vec::new(), discard.clone());

        let drawn = piles.draw(&mut rng).expect("draw should succeed");
        let mut everything = piles.draw.clone();
        everything.push(drawn);

        assert_eq!(everything.len(), discard.len());
        for card in &discard {
            let expected = discard.iter().filter(|c| *c == card).count();
            let actual = everything.iter().filter(|c| *c == card).count();
            assert_eq!(expected, actual, "card {card} lost during reshuffle");
        }
    }

    #[test]
    fn drawing_from_exhausted_piles_is_an_integrity_error() {
        let mut rng = ScriptedRng::default();
        let mut piles = Piles::default();
        assert_eq!(piles.draw(&mut rng), Err(IntegrityError::PilesExhausted));
    }

    #[test]
    fn discarding_untaps_the_card() {
        let mut piles = Piles::default();
        let mut card = Card::new(Rank::Five, Suit::Hearts);
        card.tapped = true;
        piles.discard(card);
        assert!(!piles.discard[0].tapped);
    }

    #[test]
    fn card_labels_use_suit_symbols() {
        assert_eq!(Card::new(Rank::Ten, Suit::Spades).to_string(), "10♠");
        assert_eq!(Card::joker().to_string(), "Joker");
    }
}
