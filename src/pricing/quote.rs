//! Pricing output lines.

use std::fmt;

use rust_decimal::Decimal;
use strum::{Display, EnumString};

use crate::orderbook::{cents_to_decimal, Side};

/// What a quote prices: buying the target from asks or selling it into bids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Action {
    /// Expense of buying the target size, swept from the ask book.
    #[strum(serialize = "B")]
    Buy,
    /// Income from selling the target size, swept from the bid book.
    #[strum(serialize = "S")]
    Sell,
}

impl Action {
    /// Action priced by sweeping `side`.
    pub fn priced_from(side: Side) -> Self {
        match side {
            Side::Ask => Action::Buy,
            Side::Bid => Action::Sell,
        }
    }

    /// Lowercase label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Action::Buy => "buy",
            Action::Sell => "sell",
        }
    }
}

/// One emitted pricing event.
///
/// Renders as `<timestamp> <B|S> <total>` or `<timestamp> <B|S> NA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Timestamp of the event that changed the result.
    pub timestamp: u32,
    /// Buy expense or sell income.
    pub action: Action,
    /// Total in cents; `None` once the target can no longer be filled.
    pub total: Option<u64>,
}

impl Quote {
    /// A priced quote.
    pub fn priced(timestamp: u32, action: Action, total: u64) -> Self {
        Self {
            timestamp,
            action,
            total: Some(total),
        }
    }

    /// A not-available quote.
    pub fn unavailable(timestamp: u32, action: Action) -> Self {
        Self {
            timestamp,
            action,
            total: None,
        }
    }

    /// Total as a two-decimal amount.
    pub fn amount(&self) -> Option<Decimal> {
        self.total.map(cents_to_decimal)
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.amount() {
            Some(amount) => write!(f, "{} {} {}", self.timestamp, self.action, amount),
            None => write!(f, "{} {} NA", self.timestamp, self.action),
        }
    }
}
