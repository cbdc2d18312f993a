use std::fmt;

use serde::Serialize;

use crate::{
    config::TableConfig,
    deck::{Card, Deck, DeckSource},
    error::TableError,
    hand::{hand_value, is_blackjack, is_bust, is_pair},
    outcome::Settlement,
    view::{Actions, BetLimits, HandView, TableView},
};

/// Dealer draws while below this total, soft or hard.
const DEALER_STANDS_ON: u32 = 17;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Deal,
    Hit,
    Stand,
    Double,
    Split,
    TakeInsurance,
    DeclineInsurance,
    Next,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Deal => "deal",
            Action::Hit => "hit",
            Action::Stand => "stand",
            Action::Double => "double",
            Action::Split => "split",
            Action::TakeInsurance => "take insurance",
            Action::DeclineInsurance => "decline insurance",
            Action::Next => "start the next round",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    PlayerTurn,
    SplitPlayerTurn,
    Resolved,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Idle => "no round is in progress",
            Phase::PlayerTurn => "the hand is in play",
            Phase::SplitPlayerTurn => "the split hand is in play",
            Phase::Resolved => "the round is over",
        })
    }
}

/// Which player hand receives the next action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    Player,
    Split,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Insurance {
    NotOffered,
    /// Dealer shows an ace; the blackjack peek waits for the decision.
    Offered,
    Taken,
    Declined,
}

#[derive(Clone, Debug)]
pub struct Round {
    deck: Deck,
    player: Vec<Card>,
    split_hand: Option<Vec<Card>>,
    dealer: Vec<Card>,
    bet: u32,
    seat: Seat,
    insurance: Insurance,
}

impl Round {
    pub fn bet(&self) -> u32 {
        self.bet
    }

    pub fn player(&self) -> &[Card] {
        &self.player
    }

    pub fn split_hand(&self) -> Option<&[Card]> {
        self.split_hand.as_deref()
    }

    pub fn dealer(&self) -> &[Card] {
        &self.dealer
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn insurance(&self) -> Insurance {
        self.insurance
    }

    pub fn is_split(&self) -> bool {
        self.split_hand.is_some()
    }

    fn active_hand(&self) -> &[Card] {
        match (self.seat, &self.split_hand) {
            (Seat::Split, Some(hand)) => hand,
            _ => &self.player,
        }
    }

    fn active_hand_mut(&mut self) -> &mut Vec<Card> {
        match (self.seat, &mut self.split_hand) {
            (Seat::Split, Some(hand)) => hand,
            _ => &mut self.player,
        }
    }

    fn can_split(&self) -> bool {
        !self.is_split() && is_pair(&self.player)
    }

    fn play_dealer(&mut self) -> Result<(), TableError> {
        while hand_value(&self.dealer) < DEALER_STANDS_ON {
            let card = self.deck.draw()?;
            self.dealer.push(card);
        }
        Ok(())
    }

    /// Closes an open insurance offer and peeks at the dealer's hand.
    /// Returns the settlement when the dealer holds blackjack.
    fn close_insurance(&mut self, taken: bool) -> Option<Settlement> {
        if self.insurance != Insurance::Offered {
            return None;
        }
        self.insurance = if taken {
            Insurance::Taken
        } else {
            Insurance::Declined
        };
        if !is_blackjack(&self.dealer) {
            return None;
        }
        Some(if taken {
            Settlement::new("Dealer has Blackjack. Insurance pays 2:1.", self.bet, 0)
        } else {
            Settlement::new("Dealer has Blackjack. You lose.", 0, self.bet)
        })
    }
}

/// Compares one finished hand against the dealer's final hand.
pub fn resolve_hand(hand: &[Card], dealer: &[Card], stake: u32) -> Settlement {
    let player_value = hand_value(hand);
    let dealer_value = hand_value(dealer);
    if player_value > 21 {
        Settlement::new("Bust! You lose.", 0, stake)
    } else if dealer_value > 21 {
        Settlement::new("Dealer busts! You win.", stake * 2, 0)
    } else if player_value > dealer_value {
        Settlement::new("You win!", stake * 2, 0)
    } else if player_value < dealer_value {
        Settlement::new("You lose.", 0, stake)
    } else {
        Settlement::new("Push!", stake, 0)
    }
}

#[derive(Clone, Debug, Default)]
enum TableState {
    #[default]
    Idle,
    Playing(Round),
    Resolved(Round, Settlement),
}

impl TableState {
    fn phase(&self) -> Phase {
        match self {
            TableState::Idle => Phase::Idle,
            TableState::Playing(round) if round.seat() == Seat::Split => Phase::SplitPlayerTurn,
            TableState::Playing(_) => Phase::PlayerTurn,
            TableState::Resolved(..) => Phase::Resolved,
        }
    }

    fn round(&self) -> Option<&Round> {
        match self {
            TableState::Idle => None,
            TableState::Playing(round) | TableState::Resolved(round, _) => Some(round),
        }
    }
}

/// A single-seat blackjack table. Money and lifetime totals persist across
/// rounds; each deal starts a fresh 52-card deck from `source`.
pub struct Table<S> {
    source: S,
    config: TableConfig,
    money: u32,
    total_win: u32,
    total_loss: u32,
    last_bet: u32,
    state: TableState,
    message: String,
}

impl<S: DeckSource> Table<S> {
    pub fn new(config: TableConfig, source: S) -> Self {
        let config = config.validated();
        Table {
            source,
            money: config.starting_money,
            total_win: 0,
            total_loss: 0,
            last_bet: config.default_bet,
            state: TableState::Idle,
            message: String::new(),
            config,
        }
    }

    pub fn money(&self) -> u32 {
        self.money
    }

    pub fn total_win(&self) -> u32 {
        self.total_win
    }

    pub fn total_loss(&self) -> u32 {
        self.total_loss
    }

    pub fn last_bet(&self) -> u32 {
        self.last_bet
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn round(&self) -> Option<&Round> {
        self.state.round()
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        match &self.state {
            TableState::Resolved(_, settlement) => Some(settlement),
            _ => None,
        }
    }

    pub fn bet_limits(&self) -> BetLimits {
        BetLimits {
            min: 1,
            max: self.config.max_bet.min(self.money).max(1),
        }
    }

    /// Normalizes a raw bet from the input box into the allowed range.
    pub fn clamp_bet(&self, raw: i64) -> u32 {
        let limits = self.bet_limits();
        let clamped = raw.max(i64::from(limits.min)).min(i64::from(limits.max));
        u32::try_from(clamped).unwrap_or(limits.min)
    }

    pub fn deal(&mut self, requested: i64, repeat_last: bool) -> Result<TableView, TableError> {
        if let TableState::Playing(_) = &self.state {
            let phase = self.phase();
            return Err(self.reject(TableError::InvalidState {
                action: Action::Deal,
                phase,
            }));
        }
        if self.money < 1 {
            return Err(self.reject(TableError::OutOfMoney));
        }
        let bet = if repeat_last {
            if self.money < self.last_bet {
                return Err(self.reject(TableError::NotEnoughForRepeat {
                    last_bet: self.last_bet,
                    available: self.money,
                }));
            }
            self.last_bet
        } else {
            self.clamp_bet(requested)
        };

        let mut deck = self.source.fresh_deck();
        let mut player = Vec::with_capacity(4);
        let mut dealer = Vec::with_capacity(4);
        for _ in 0..2 {
            player.push(deck.draw()?);
            dealer.push(deck.draw()?);
        }

        self.money -= bet;
        self.last_bet = bet;
        let insurance = if dealer[1].is_ace() {
            Insurance::Offered
        } else {
            Insurance::NotOffered
        };
        let mut round = Round {
            deck,
            player,
            split_hand: None,
            dealer,
            bet,
            seat: Seat::Player,
            insurance,
        };
        tracing::debug!(bet, money = self.money, "dealt new round");

        if is_blackjack(&round.player) {
            round.insurance = Insurance::NotOffered;
            round.play_dealer()?;
            let settlement = if is_blackjack(&round.dealer) {
                Settlement::new("Push! Both have Blackjack.", bet, 0)
            } else {
                Settlement::new("Blackjack! You win 1.5x bet.", bet * 5 / 2, 0)
            };
            return Ok(self.settle(round, settlement));
        }

        if round.insurance == Insurance::Offered {
            self.message = "Dealer shows Ace. Insurance?".to_string();
        } else if is_blackjack(&round.dealer) {
            let settlement = Settlement::new("Dealer has Blackjack. You lose.", 0, bet);
            return Ok(self.settle(round, settlement));
        } else {
            self.message.clear();
        }
        self.state = TableState::Playing(round);
        Ok(self.view())
    }

    pub fn hit(&mut self) -> Result<TableView, TableError> {
        let mut round = self.take_round(Action::Hit)?;
        if let Some(settlement) = round.close_insurance(false) {
            return Ok(self.settle(round, settlement));
        }

        let card = round.deck.draw()?;
        round.active_hand_mut().push(card);
        tracing::debug!(card = %card, seat = ?round.seat, "hit");

        if is_bust(round.active_hand()) {
            if round.is_split() && round.seat == Seat::Player {
                round.seat = Seat::Split;
                self.message = "First hand busts! Now playing split hand.".to_string();
            } else {
                // A split-hand bust ends the round on that stake alone; the
                // first hand is never resolved.
                let settlement = Settlement::new("Bust! You lose.", 0, round.bet);
                return Ok(self.settle(round, settlement));
            }
        } else {
            self.message.clear();
        }
        self.state = TableState::Playing(round);
        Ok(self.view())
    }

    pub fn stand(&mut self) -> Result<TableView, TableError> {
        let mut round = self.take_round(Action::Stand)?;
        if let Some(settlement) = round.close_insurance(false) {
            return Ok(self.settle(round, settlement));
        }

        if round.is_split() && round.seat == Seat::Player {
            round.seat = Seat::Split;
            self.message = "Now playing split hand.".to_string();
            self.state = TableState::Playing(round);
            return Ok(self.view());
        }

        round.play_dealer()?;
        let settlement = match &round.split_hand {
            Some(split_hand) => Settlement::split(
                resolve_hand(&round.player, &round.dealer, round.bet),
                resolve_hand(split_hand, &round.dealer, round.bet),
            ),
            None => resolve_hand(&round.player, &round.dealer, round.bet),
        };
        Ok(self.settle(round, settlement))
    }

    /// Doubles the active hand's stake, draws exactly one card and resolves.
    /// Doubling ends the round even on the first hand of a split.
    pub fn double(&mut self) -> Result<TableView, TableError> {
        let mut round = self.take_round(Action::Double)?;
        if self.money < round.bet {
            let err = TableError::InsufficientFunds {
                action: Action::Double,
                needed: round.bet,
                available: self.money,
            };
            self.state = TableState::Playing(round);
            return Err(self.reject(err));
        }
        if let Some(settlement) = round.close_insurance(false) {
            return Ok(self.settle(round, settlement));
        }

        self.money -= round.bet;
        let card = round.deck.draw()?;
        round.active_hand_mut().push(card);
        tracing::debug!(card = %card, seat = ?round.seat, "doubled");

        round.play_dealer()?;
        let settlement = resolve_hand(round.active_hand(), &round.dealer, round.bet * 2);
        Ok(self.settle(round, settlement))
    }

    pub fn split(&mut self) -> Result<TableView, TableError> {
        let mut round = self.take_round(Action::Split)?;
        let refusal = if round.is_split() {
            Some(TableError::NotAllowed {
                action: Action::Split,
                reason: "the hand has already been split",
            })
        } else if !is_pair(&round.player) {
            Some(TableError::NotAllowed {
                action: Action::Split,
                reason: "only an opening pair of equal value can be split",
            })
        } else if self.money < round.bet {
            Some(TableError::InsufficientFunds {
                action: Action::Split,
                needed: round.bet,
                available: self.money,
            })
        } else {
            None
        };
        if let Some(err) = refusal {
            self.state = TableState::Playing(round);
            return Err(self.reject(err));
        }
        if let Some(settlement) = round.close_insurance(false) {
            return Ok(self.settle(round, settlement));
        }

        let mut split_hand = Vec::with_capacity(4);
        split_hand.extend(round.player.pop());
        round.player.push(round.deck.draw()?);
        split_hand.push(round.deck.draw()?);
        self.money -= round.bet;
        round.split_hand = Some(split_hand);
        round.seat = Seat::Player;
        tracing::debug!(bet = round.bet, money = self.money, "split");

        self.message.clear();
        self.state = TableState::Playing(round);
        Ok(self.view())
    }

    pub fn take_insurance(&mut self) -> Result<TableView, TableError> {
        let mut round = self.take_round(Action::TakeInsurance)?;
        let stake = round.bet / 2;
        let refusal = if round.insurance != Insurance::Offered {
            Some(TableError::NotAllowed {
                action: Action::TakeInsurance,
                reason: "insurance is not on offer",
            })
        } else if self.money < stake {
            Some(TableError::InsufficientFunds {
                action: Action::TakeInsurance,
                needed: stake,
                available: self.money,
            })
        } else {
            None
        };
        if let Some(err) = refusal {
            self.state = TableState::Playing(round);
            return Err(self.reject(err));
        }

        self.money -= stake;
        tracing::debug!(stake, money = self.money, "insurance taken");
        if let Some(settlement) = round.close_insurance(true) {
            return Ok(self.settle(round, settlement));
        }
        self.message = "Insurance taken.".to_string();
        self.state = TableState::Playing(round);
        Ok(self.view())
    }

    pub fn decline_insurance(&mut self) -> Result<TableView, TableError> {
        let mut round = self.take_round(Action::DeclineInsurance)?;
        if round.insurance != Insurance::Offered {
            self.state = TableState::Playing(round);
            return Err(self.reject(TableError::NotAllowed {
                action: Action::DeclineInsurance,
                reason: "insurance is not on offer",
            }));
        }
        if let Some(settlement) = round.close_insurance(false) {
            return Ok(self.settle(round, settlement));
        }
        self.message = "Insurance declined.".to_string();
        self.state = TableState::Playing(round);
        Ok(self.view())
    }

    /// Clears a finished round so the table is ready to deal again.
    pub fn next(&mut self) -> Result<TableView, TableError> {
        if let TableState::Playing(_) = &self.state {
            let phase = self.phase();
            return Err(self.reject(TableError::InvalidState {
                action: Action::Next,
                phase,
            }));
        }
        self.state = TableState::Idle;
        self.message.clear();
        Ok(self.view())
    }

    pub fn view(&self) -> TableView {
        let round = self.state.round();
        let (player, split, dealer) = match &self.state {
            TableState::Idle => (HandView::default(), None, HandView::default()),
            TableState::Playing(round) => (
                HandView::open(&round.player),
                round.split_hand.as_deref().map(HandView::open),
                HandView::hole_card_hidden(&round.dealer),
            ),
            TableState::Resolved(round, _) => (
                HandView::open(&round.player),
                round.split_hand.as_deref().map(HandView::open),
                HandView::open(&round.dealer),
            ),
        };
        let bet = round.map_or(self.last_bet, Round::bet);

        TableView {
            phase: self.phase(),
            money: self.money,
            bet,
            split_bet: round.filter(|r| r.is_split()).map(Round::bet),
            total_win: self.total_win,
            total_loss: self.total_loss,
            player,
            split,
            dealer,
            active_hand: match &self.state {
                TableState::Playing(round) => Some(round.seat()),
                _ => None,
            },
            message: self.message.clone(),
            outcome: self.settlement().map(Settlement::outcome),
            actions: self.actions(),
            bet_limits: self.bet_limits(),
            rejected: false,
        }
    }

    /// The current view carrying a rejected action's message instead.
    pub fn rejection(&self, err: &TableError) -> TableView {
        TableView {
            message: err.to_string(),
            rejected: true,
            ..self.view()
        }
    }

    fn actions(&self) -> Actions {
        match &self.state {
            TableState::Playing(round) => {
                let offered = round.insurance == Insurance::Offered;
                Actions {
                    hit: true,
                    stand: true,
                    double: self.money >= round.bet,
                    split: round.can_split() && self.money >= round.bet,
                    insurance: offered && self.money >= round.bet / 2,
                    decline_insurance: offered,
                    ..Actions::default()
                }
            }
            TableState::Idle | TableState::Resolved(..) => Actions {
                deal: self.money >= 1,
                repeat_bet: self.money >= 1 && self.money >= self.last_bet,
                next: matches!(self.state, TableState::Resolved(..)),
                ..Actions::default()
            },
        }
    }

    fn take_round(&mut self, action: Action) -> Result<Round, TableError> {
        match std::mem::take(&mut self.state) {
            TableState::Playing(round) => Ok(round),
            other => {
                let phase = other.phase();
                self.state = other;
                Err(self.reject(TableError::InvalidState { action, phase }))
            }
        }
    }

    fn reject(&self, err: TableError) -> TableError {
        tracing::warn!(phase = ?self.phase(), money = self.money, "rejected: {err}");
        err
    }

    /// Pays out a resolved round. Runs exactly once per round.
    fn settle(&mut self, round: Round, settlement: Settlement) -> TableView {
        self.money = self.money.saturating_add(settlement.win);
        self.total_win = self.total_win.saturating_add(settlement.win);
        self.total_loss = self.total_loss.saturating_add(settlement.loss);
        tracing::info!(
            win = settlement.win,
            loss = settlement.loss,
            money = self.money,
            "round settled"
        );
        self.message = settlement.summary();
        self.state = TableState::Resolved(round, settlement);
        self.view()
    }
}
