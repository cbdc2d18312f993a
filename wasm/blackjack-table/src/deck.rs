use std::fmt;

use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};
use serde::Serialize;

use crate::error::TableError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Suit {
    #[serde(rename = "♠")]
    Spades,
    #[serde(rename = "♥")]
    Hearts,
    #[serde(rename = "♦")]
    Diamonds,
    #[serde(rename = "♣")]
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "♠",
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Rank {
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Face value, with the ace always counted high.
    pub fn value(self) -> u8 {
        match self {
            Rank::Ace => 11,
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
        }
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
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
    pub value: u8,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Card {
            suit,
            rank,
            value: rank.value(),
        }
    }

    pub fn is_ace(&self) -> bool {
        self.rank == Rank::Ace
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.label(), self.suit.symbol())
    }
}

/// One round's worth of cards. Draws come off the tail.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// The 52 standard cards in suit-major order.
    pub fn ordered() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(rank, suit));
            }
        }
        Deck { cards }
    }

    /// Wraps an explicit card order; the last card is drawn first.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Deck { cards }
    }

    pub fn shuffled(rng: &mut SmallRng) -> Self {
        let mut deck = Deck::ordered();
        // Fisher-Yates: walks i from the last index down, swapping with [0, i].
        deck.cards.shuffle(rng);
        deck
    }

    pub fn draw(&mut self) -> Result<Card, TableError> {
        self.cards.pop().ok_or(TableError::DeckExhausted)
    }

    pub fn remaining_cards(&self) -> usize {
        self.cards.len()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

/// Where a table gets the fresh deck for each round.
pub trait DeckSource {
    fn fresh_deck(&mut self) -> Deck;
}

pub struct Shuffled {
    rng: SmallRng,
}

impl Shuffled {
    pub fn seeded(seed: u64) -> Self {
        Shuffled {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Shuffled {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Shuffled::seeded(seed),
            None => Shuffled::from_entropy(),
        }
    }
}

impl DeckSource for Shuffled {
    fn fresh_deck(&mut self) -> Deck {
        Deck::shuffled(&mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_ordered_deck_has_52_unique_cards() {
        let deck = Deck::ordered();
        let unique: HashSet<Card> = deck.cards().iter().copied().collect();
        assert_eq!(deck.remaining_cards(), 52);
        assert_eq!(unique.len(), 52);
    }

    #[test]
    fn test_card_values() {
        assert_eq!(Card::new(Rank::Ace, Suit::Spades).value, 11);
        assert_eq!(Card::new(Rank::Seven, Suit::Hearts).value, 7);
        assert_eq!(Card::new(Rank::Ten, Suit::Clubs).value, 10);
        assert_eq!(Card::new(Rank::Queen, Suit::Diamonds).value, 10);
    }

    #[test]
    fn test_card_display() {
        assert_eq!(Card::new(Rank::Ten, Suit::Hearts).to_string(), "10♥");
        assert_eq!(Card::new(Rank::Ace, Suit::Spades).to_string(), "A♠");
    }

    #[test]
    fn test_draw_takes_from_tail() {
        let first = Card::new(Rank::Two, Suit::Clubs);
        let last = Card::new(Rank::King, Suit::Hearts);
        let mut deck = Deck::from_cards(vec![first, last]);
        assert_eq!(deck.draw().unwrap(), last);
        assert_eq!(deck.draw().unwrap(), first);
    }

    #[test]
    fn test_draw_from_empty_deck_fails() {
        let mut deck = Deck::from_cards(Vec::new());
        assert!(matches!(deck.draw(), Err(TableError::DeckExhausted)));
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let mut a = Shuffled::seeded(7);
        let mut b = Shuffled::seeded(7);
        assert_eq!(a.fresh_deck().cards(), b.fresh_deck().cards());
    }

    #[test]
    fn test_consecutive_decks_differ() {
        let mut source = Shuffled::seeded(42);
        let first = source.fresh_deck();
        let second = source.fresh_deck();
        assert_ne!(first.cards(), second.cards());
    }

    #[test]
    fn test_draining_a_deck_never_repeats() {
        let mut deck = Shuffled::seeded(3).fresh_deck();
        let mut seen = HashSet::new();
        while let Ok(card) = deck.draw() {
            assert!(seen.insert(card), "card {card} drawn twice");
        }
        assert_eq!(seen.len(), 52);
    }

    proptest! {
        #[test]
        fn shuffle_is_a_permutation_of_the_standard_deck(
            seed in any::<u64>(),
            rounds in 1usize..8,
        ) {
            let mut source = Shuffled::seeded(seed);
            let standard: HashSet<Card> = Deck::ordered().cards().iter().copied().collect();
            for _ in 0..rounds {
                let deck = source.fresh_deck();
                let cards: HashSet<Card> = deck.cards().iter().copied().collect();
                prop_assert_eq!(deck.remaining_cards(), 52);
                prop_assert_eq!(&cards, &standard);
            }
        }
    }
}
