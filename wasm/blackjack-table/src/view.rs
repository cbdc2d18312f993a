use serde::Serialize;

use crate::{
    deck::Card,
    hand::hand_value_display,
    outcome::Outcome,
    table::{Phase, Seat},
};

/// What the page renders for one hand. Face-down cards are `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HandView {
    pub cards: Vec<Option<Card>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl HandView {
    pub fn open(cards: &[Card]) -> Self {
        HandView {
            cards: cards.iter().copied().map(Some).collect(),
            value: if cards.is_empty() {
                None
            } else {
                Some(hand_value_display(cards).to_string())
            },
        }
    }

    /// Dealer hand with the hole card (the first one dealt) face down.
    pub fn hole_card_hidden(cards: &[Card]) -> Self {
        HandView {
            cards: cards
                .iter()
                .enumerate()
                .map(|(i, card)| if i == 0 { None } else { Some(*card) })
                .collect(),
            value: None,
        }
    }
}

/// Buttons the page should enable next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Actions {
    pub deal: bool,
    pub repeat_bet: bool,
    pub hit: bool,
    pub stand: bool,
    pub double: bool,
    pub split: bool,
    pub insurance: bool,
    pub decline_insurance: bool,
    pub next: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BetLimits {
    pub min: u32,
    pub max: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableView {
    pub phase: Phase,
    pub money: u32,
    pub bet: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_bet: Option<u32>,
    pub total_win: u32,
    pub total_loss: u32,
    pub player: HandView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split: Option<HandView>,
    pub dealer: HandView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_hand: Option<Seat>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    pub actions: Actions,
    pub bet_limits: BetLimits,
    pub rejected: bool,
}
