use serde::Serialize;

/// Money returned to the player (`win`) and stake forfeited (`loss`) for a
/// resolved round, plus the per-hand result text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub win: u32,
    pub loss: u32,
    pub message: String,
}

impl Settlement {
    pub fn new(message: impl Into<String>, win: u32, loss: u32) -> Self {
        Settlement {
            win,
            loss,
            message: message.into(),
        }
    }

    /// Combines both halves of a split round.
    pub fn split(first: Settlement, second: Settlement) -> Self {
        Settlement {
            win: first.win + second.win,
            loss: first.loss + second.loss,
            message: format!("First hand: {} Second hand: {}", first.message, second.message),
        }
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from_totals(self.win, self.loss)
    }

    /// Result text with the amount suffix the table shows.
    pub fn summary(&self) -> String {
        match self.outcome().kind {
            OutcomeKind::Win => format!("{} - Won ${}", self.message, self.win - self.loss),
            OutcomeKind::Lose => format!("{} - Lost ${}", self.message, self.loss - self.win),
            OutcomeKind::Push => format!("{} - Push!", self.message),
            OutcomeKind::Neutral => self.message.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutcomeKind {
    Win,
    Lose,
    Push,
    Neutral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub kind: OutcomeKind,
    pub net: i64,
    pub win: u32,
    pub loss: u32,
}

impl Outcome {
    pub fn from_totals(win: u32, loss: u32) -> Self {
        let net = i64::from(win) - i64::from(loss);
        let kind = if net > 0 {
            OutcomeKind::Win
        } else if net < 0 {
            OutcomeKind::Lose
        } else if win != 0 {
            OutcomeKind::Push
        } else {
            OutcomeKind::Neutral
        };
        Outcome { kind, net, win, loss }
    }
}
