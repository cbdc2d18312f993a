use std::fmt;

use crate::deck::Card;

/// Totals the hand with every ace high, then softens aces one at a time
/// while the total is over 21. Returns the total and how many aces still
/// count as 11.
fn soften(hand: &[Card]) -> (u32, u32) {
    let mut total = 0u32;
    let mut aces = 0u32;

    for card in hand {
        total += u32::from(card.value);
        if card.is_ace() {
            aces += 1;
        }
    }

    while total > 21 && aces > 0 {
        total -= 10;
        aces -= 1;
    }

    (total, aces)
}

/// Best total for the hand: at most 21 when any ace reading allows it,
/// otherwise the smallest bust total.
pub fn hand_value(hand: &[Card]) -> u32 {
    soften(hand).0
}

pub fn is_soft(hand: &[Card]) -> bool {
    let (total, aces) = soften(hand);
    aces > 0 && total <= 21
}

pub fn is_bust(hand: &[Card]) -> bool {
    hand_value(hand) > 21
}

pub fn is_blackjack(hand: &[Card]) -> bool {
    hand.len() == 2 && hand_value(hand) == 21
}

/// Two cards of equal numeric value, so 10 and K pair up.
pub fn is_pair(hand: &[Card]) -> bool {
    hand.len() == 2 && hand[0].value == hand[1].value
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandValue {
    Hard(u32),
    /// An ace is counted as 11; `high` could also be read as `high - 10`.
    Soft { high: u32 },
}

impl fmt::Display for HandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HandValue::Hard(total) => write!(f, "{total}"),
            HandValue::Soft { high } => write!(f, "{} or {}", high - 10, high),
        }
    }
}

pub fn hand_value_display(hand: &[Card]) -> HandValue {
    let total = hand_value(hand);
    if is_soft(hand) {
        HandValue::Soft { high: total }
    } else {
        HandValue::Hard(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{Rank, Suit};
    use proptest::prelude::*;

    fn hand(ranks: &[Rank]) -> Vec<Card> {
        ranks.iter().map(|&rank| Card::new(rank, Suit::Spades)).collect()
    }

    #[test]
    fn test_hand_value_simple() {
        assert_eq!(hand_value(&hand(&[Rank::Two, Rank::Three])), 5);
        assert_eq!(hand_value(&hand(&[Rank::King, Rank::Queen])), 20);
    }

    #[test]
    fn test_hand_value_ace_king() {
        assert_eq!(hand_value(&hand(&[Rank::Ace, Rank::King])), 21);
    }

    #[test]
    fn test_hand_value_two_aces_and_nine() {
        assert_eq!(hand_value(&hand(&[Rank::Ace, Rank::Ace, Rank::Nine])), 21);
    }

    #[test]
    fn test_hand_value_four_aces_and_seven() {
        let cards = hand(&[Rank::Ace, Rank::Ace, Rank::Ace, Rank::Ace, Rank::Seven]);
        assert_eq!(hand_value(&cards), 21);
    }

    #[test]
    fn test_hand_value_hard_ace() {
        assert_eq!(hand_value(&hand(&[Rank::Ace, Rank::Six, Rank::Nine])), 16);
    }

    #[test]
    fn test_hand_value_bust_without_aces() {
        assert_eq!(hand_value(&hand(&[Rank::King, Rank::Queen, Rank::Five])), 25);
        assert!(is_bust(&hand(&[Rank::King, Rank::Queen, Rank::Five])));
    }

    #[test]
    fn test_hand_value_bust_after_softening() {
        let cards = hand(&[Rank::Ace, Rank::King, Rank::Queen, Rank::Five]);
        assert_eq!(hand_value(&cards), 26);
    }

    #[test]
    fn test_display_soft_hand() {
        let value = hand_value_display(&hand(&[Rank::Ace, Rank::Six]));
        assert_eq!(value, HandValue::Soft { high: 17 });
        assert_eq!(value.to_string(), "7 or 17");
    }

    #[test]
    fn test_display_softened_hand_with_live_ace() {
        let value = hand_value_display(&hand(&[Rank::Ace, Rank::Ace, Rank::Nine]));
        assert_eq!(value.to_string(), "11 or 21");
        assert_eq!(value, HandValue::Soft { high: 21 });
    }

    #[test]
    fn test_display_hard_hand() {
        let hard_ace = hand(&[Rank::Ace, Rank::Six, Rank::Nine]);
        assert_eq!(hand_value_display(&hard_ace).to_string(), "16");
        assert_eq!(hand_value_display(&hand(&[Rank::Ten, Rank::Nine])).to_string(), "19");
    }

    #[test]
    fn test_is_soft() {
        assert!(is_soft(&hand(&[Rank::Ace, Rank::Six])));
        assert!(!is_soft(&hand(&[Rank::Ace, Rank::Six, Rank::Nine])));
        assert!(!is_soft(&hand(&[Rank::King, Rank::Queen])));
    }

    #[test]
    fn test_is_blackjack() {
        assert!(is_blackjack(&hand(&[Rank::Ace, Rank::King])));
        assert!(!is_blackjack(&hand(&[Rank::Seven, Rank::Seven, Rank::Seven])));
        assert!(!is_blackjack(&hand(&[Rank::King, Rank::Queen])));
    }

    #[test]
    fn test_is_pair_by_value() {
        assert!(is_pair(&hand(&[Rank::Ten, Rank::King])));
        assert!(is_pair(&hand(&[Rank::Eight, Rank::Eight])));
        assert!(!is_pair(&hand(&[Rank::Ten, Rank::Nine])));
        assert!(!is_pair(&hand(&[Rank::Eight, Rank::Eight, Rank::Two])));
    }

    fn any_rank() -> impl Strategy<Value = Rank> {
        proptest::sample::select(Rank::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn value_is_best_reading(ranks in proptest::collection::vec(any_rank(), 1..12)) {
            let cards = hand(&ranks);
            let aces = ranks.iter().filter(|&&r| r == Rank::Ace).count() as u32;
            let low: u32 = cards
                .iter()
                .map(|c| if c.is_ace() { 1 } else { u32::from(c.value) })
                .sum();
            // Every ace-as-11 reading is low + 10 * k for k in 0..=aces.
            let best = (0..=aces).map(|k| low + 10 * k).filter(|&t| t <= 21).max();
            let value = hand_value(&cards);
            match best {
                Some(best) => prop_assert_eq!(value, best),
                None => prop_assert_eq!(value, low),
            }
        }
    }
}
