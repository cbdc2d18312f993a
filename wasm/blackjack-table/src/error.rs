use thiserror::Error;

use crate::table::{Action, Phase};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Out of money! Refresh to restart.")]
    OutOfMoney,

    #[error("Not enough money for previous bet.")]
    NotEnoughForRepeat { last_bet: u32, available: u32 },

    #[error("Not enough money to {action}: need ${needed}, have ${available}.")]
    InsufficientFunds {
        action: Action,
        needed: u32,
        available: u32,
    },

    #[error("Cannot {action} while {phase}.")]
    InvalidState { action: Action, phase: Phase },

    #[error("Cannot {action}: {reason}.")]
    NotAllowed { action: Action, reason: &'static str },

    #[error("deck exhausted")]
    DeckExhausted,
}

impl TableError {
    /// Everything except deck exhaustion is a rejected action the player can recover from.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TableError::DeckExhausted)
    }
}
