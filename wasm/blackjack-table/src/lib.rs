use wasm_bindgen::prelude::*;

mod config;
mod deck;
mod error;
mod hand;
mod outcome;
mod table;
mod view;

pub use config::TableConfig;
pub use deck::{Card, Deck, DeckSource, Rank, Shuffled, Suit};
pub use error::TableError;
pub use hand::{hand_value, hand_value_display, is_blackjack, is_bust, is_pair, is_soft, HandValue};
pub use outcome::{Outcome, OutcomeKind, Settlement};
pub use table::{resolve_hand, Action, Insurance, Phase, Round, Seat, Table};
pub use view::{Actions, BetLimits, HandView, TableView};

fn init() {
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    {
        static TRACING: std::sync::Once = std::sync::Once::new();
        TRACING.call_once(tracing_wasm::set_as_global_default);
    }
}

/// Mirrors how `parseInt` input reaches the table: fractions truncate and
/// anything unparseable becomes the minimum bet.
fn bet_from_js(raw: f64) -> i64 {
    if raw.is_nan() {
        1
    } else {
        raw.trunc() as i64
    }
}

/// The page's handle on one table. Every action returns the full view;
/// rejected actions come back as a view with `rejected: true`.
#[wasm_bindgen]
pub struct BlackjackTable {
    table: Table<Shuffled>,
}

#[wasm_bindgen]
impl BlackjackTable {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<BlackjackTable, JsValue> {
        init();
        let config: TableConfig = if config.is_undefined() || config.is_null() {
            TableConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|err| JsValue::from_str(&format!("Invalid config: {err}")))?
        };
        let source = Shuffled::new(config.seed);
        Ok(BlackjackTable {
            table: Table::new(config, source),
        })
    }

    pub fn deal(&mut self, bet: f64, repeat: bool) -> Result<JsValue, JsValue> {
        console_error_panic_hook::set_once();
        let result = self.table.deal(bet_from_js(bet), repeat);
        self.respond(result)
    }

    pub fn hit(&mut self) -> Result<JsValue, JsValue> {
        console_error_panic_hook::set_once();
        let result = self.table.hit();
        self.respond(result)
    }

    pub fn stand(&mut self) -> Result<JsValue, JsValue> {
        console_error_panic_hook::set_once();
        let result = self.table.stand();
        self.respond(result)
    }

    pub fn double(&mut self) -> Result<JsValue, JsValue> {
        console_error_panic_hook::set_once();
        let result = self.table.double();
        self.respond(result)
    }

    pub fn split(&mut self) -> Result<JsValue, JsValue> {
        console_error_panic_hook::set_once();
        let result = self.table.split();
        self.respond(result)
    }

    pub fn take_insurance(&mut self) -> Result<JsValue, JsValue> {
        console_error_panic_hook::set_once();
        let result = self.table.take_insurance();
        self.respond(result)
    }

    pub fn decline_insurance(&mut self) -> Result<JsValue, JsValue> {
        console_error_panic_hook::set_once();
        let result = self.table.decline_insurance();
        self.respond(result)
    }

    pub fn next(&mut self) -> Result<JsValue, JsValue> {
        console_error_panic_hook::set_once();
        let result = self.table.next();
        self.respond(result)
    }

    pub fn view(&self) -> Result<JsValue, JsValue> {
        console_error_panic_hook::set_once();
        to_js(&self.table.view())
    }

    /// Normalizes the bet input box as the user types.
    pub fn clamp_bet(&self, raw: f64) -> u32 {
        console_error_panic_hook::set_once();
        self.table.clamp_bet(bet_from_js(raw))
    }
}

impl BlackjackTable {
    fn respond(&self, result: Result<TableView, TableError>) -> Result<JsValue, JsValue> {
        let view = match result {
            Ok(view) => view,
            Err(err) if err.is_fatal() => {
                return Err(JsValue::from_str(&format!("Table failed: {err}")));
            }
            Err(err) => self.table.rejection(&err),
        };
        to_js(&view)
    }
}

fn to_js(view: &TableView) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(view)
        .map_err(|err| JsValue::from_str(&format!("Serialization failed: {err}")))
}
