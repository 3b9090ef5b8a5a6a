//! Order book types and data structures.

use std::collections::HashMap;
use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Number of fractional digits carried by [`Price`] and by emitted totals.
pub const PRICE_SCALE: u32 = 2;

/// Render an integer amount of cents as a two-decimal [`Decimal`].
pub fn cents_to_decimal(cents: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(cents), PRICE_SCALE)
}

/// Limit price in integer cents.
///
/// Prices never pass through `f64`: `44.10` is exactly `4410`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Highest accepted price.
    ///
    /// `MAX * u32::MAX` still fits in a `u64`, so a sweep for any `u32`
    /// target cannot overflow its cent total.
    pub const MAX: Price = Price(u64::MAX / u32::MAX as u64);

    /// Create a price from an integer number of cents.
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Convert a decimal price to cents.
    ///
    /// Digits beyond the second decimal are truncated. Returns `None` for
    /// negative values and for prices above [`Price::MAX`].
    pub fn from_decimal(price: Decimal) -> Option<Self> {
        if price.is_sign_negative() && !price.is_zero() {
            return None;
        }
        price
            .checked_mul(Decimal::ONE_HUNDRED)?
            .trunc()
            .to_u64()
            .map(Self)
            .filter(|p| *p <= Self::MAX)
    }

    /// Integer cents.
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Decimal view of this price (two fractional digits).
    pub fn to_decimal(self) -> Decimal {
        cents_to_decimal(self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

/// Book side an Add order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum Side {
    /// Buy interest, best price is the highest.
    #[strum(serialize = "B", serialize = "bid")]
    Bid,
    /// Sell interest, best price is the lowest.
    #[strum(serialize = "S", serialize = "ask")]
    Ask,
}

/// Instrument-wide unique order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Create an order id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Payload carried by an Add event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddDetails {
    /// Side the order rests on.
    pub side: Side,
    /// Limit price.
    pub limit_price: Price,
}

/// Payload carried by a Reduce event. The price is resolved by the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReduceDetails;

/// Add-or-reduce payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDetails {
    /// New resting quantity.
    Add(AddDetails),
    /// Quantity removed from an existing order.
    Reduce(ReduceDetails),
}

/// Event kind, used for logging and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum OrderKind {
    /// Add event.
    #[strum(serialize = "A", serialize = "add")]
    Add,
    /// Reduce event.
    #[strum(serialize = "R", serialize = "reduce")]
    Reduce,
}

/// One parsed input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Opaque, monotonic event timestamp.
    pub timestamp: u32,
    /// Order identifier.
    pub id: OrderId,
    /// Quantity added or removed.
    pub size: u32,
    /// Kind-specific payload.
    pub details: OrderDetails,
}

impl Order {
    /// Create an Add event.
    pub fn add(
        timestamp: u32,
        id: impl Into<OrderId>,
        side: Side,
        limit_price: Price,
        size: u32,
    ) -> Self {
        Self {
            timestamp,
            id: id.into(),
            size,
            details: OrderDetails::Add(AddDetails { side, limit_price }),
        }
    }

    /// Create a Reduce event.
    pub fn reduce(timestamp: u32, id: impl Into<OrderId>, size: u32) -> Self {
        Self {
            timestamp,
            id: id.into(),
            size,
            details: OrderDetails::Reduce(ReduceDetails),
        }
    }

    /// Event kind.
    pub fn kind(&self) -> OrderKind {
        match self.details {
            OrderDetails::Add(_) => OrderKind::Add,
            OrderDetails::Reduce(_) => OrderKind::Reduce,
        }
    }
}

/// All resting quantity at one price on one side, keyed by order id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceLevel {
    orders: HashMap<OrderId, u32>,
    quantity: u64,
}

impl PriceLevel {
    /// Aggregated quantity at this level.
    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Number of orders resting at this level.
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Whether the level holds no orders.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Remaining quantity of one order at this level.
    pub fn quantity_of(&self, id: &OrderId) -> Option<u32> {
        self.orders.get(id).copied()
    }

    /// Per-order quantities, in no particular order.
    pub fn orders(&self) -> impl Iterator<Item = (&OrderId, u32)> {
        self.orders.iter().map(|(id, qty)| (id, *qty))
    }

    pub(crate) fn insert(&mut self, id: OrderId, size: u32) {
        self.quantity += u64::from(size);
        self.orders.insert(id, size);
    }

    /// Remove up to `amount` from `id`. Returns `(removed, remaining)`.
    pub(crate) fn reduce(&mut self, id: &OrderId, amount: u32) -> Option<(u32, u32)> {
        let previous = *self.orders.get(id)?;
        if amount >= previous {
            self.orders.remove(id);
            self.quantity -= u64::from(previous);
            Some((previous, 0))
        } else {
            let remaining = previous - amount;
            self.orders.insert(id.clone(), remaining);
            self.quantity -= u64::from(amount);
            Some((amount, remaining))
        }
    }
}

/// Mutation kind reported to book observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MutationKind {
    /// Quantity was added.
    Add,
    /// Quantity was removed.
    Reduce,
}

/// Committed book change, passed to observers after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation<'a> {
    /// What happened.
    pub kind: MutationKind,
    /// Timestamp of the triggering event.
    pub timestamp: u32,
    /// Order that changed.
    pub id: &'a OrderId,
    /// Price level touched.
    pub price: Price,
    /// Quantity actually added or removed.
    pub size: u32,
    /// Book-wide outstanding quantity after the change.
    pub total_quantity: u64,
}
