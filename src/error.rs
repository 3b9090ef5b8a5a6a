//! Unified error types for the pricer.

use strum::{Display, EnumString};
use thiserror::Error;

use crate::orderbook::{OrderId, Price};

/// Unified error type for the pricer process.
///
/// Per-event failures are [`OrderError`] and never reach this type; only
/// bootstrap and I/O failures end a run.
#[derive(Error, Debug)]
pub enum PricerError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-event error codes reported on the error stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input line could not be turned into an order.
    ParseFailed,
    /// Add rejected by the book.
    AddFailed,
    /// Reduce of an id no book holds.
    ReduceFailed,
}

impl ErrorCode {
    /// Human text printed for this code.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::ParseFailed => "failed to parse order",
            ErrorCode::AddFailed => "failed to add order",
            ErrorCode::ReduceFailed => "failed to reduce order",
        }
    }
}

/// Recoverable failure of a single event.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum OrderError {
    /// Malformed input line.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Add could not be applied.
    #[error("add of order {id} failed: {source}")]
    AddFailed {
        /// Offending order id.
        id: OrderId,
        /// Book-level cause.
        source: BookError,
    },

    /// Reduce of an id resting on neither side.
    #[error("reduce of unknown order {id}")]
    ReduceFailed {
        /// Offending order id.
        id: OrderId,
    },
}

impl OrderError {
    /// Error code for reporting.
    pub fn code(&self) -> ErrorCode {
        match self {
            OrderError::Parse(_) => ErrorCode::ParseFailed,
            OrderError::AddFailed { .. } => ErrorCode::AddFailed,
            OrderError::ReduceFailed { .. } => ErrorCode::ReduceFailed,
        }
    }
}

/// Single-side book errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    /// Id already rests in this book.
    #[error("order {id} already rests in the book")]
    DuplicateId {
        /// The duplicated id.
        id: OrderId,
    },

    /// Id does not rest in this book.
    #[error("order {id} not found")]
    UnknownId {
        /// The missing id.
        id: OrderId,
    },

    /// Add with nothing to rest.
    #[error("order {id} has zero quantity")]
    ZeroQuantity {
        /// The rejected id.
        id: OrderId,
    },
}

/// Input line parsing errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Line ended before a required field.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Timestamp is not an unsigned 32-bit integer.
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// Action letter is neither `A` nor `R`.
    #[error("invalid action: {0:?}")]
    InvalidAction(String),

    /// Side letter is neither `B` nor `S`.
    #[error("invalid side: {0:?}")]
    InvalidSide(String),

    /// Limit price is not a non-negative decimal up to the maximum price.
    #[error("invalid price: {0:?}")]
    InvalidPrice(String),

    /// Size is not an unsigned 32-bit integer.
    #[error("invalid size: {0:?}")]
    InvalidSize(String),

    /// Size of zero.
    #[error("size must be positive")]
    ZeroSize,

    /// Line bytes are not UTF-8; holds the length of the valid prefix.
    #[error("line is not valid UTF-8 after byte {0}")]
    InvalidUtf8(usize),

    /// Extra tokens after the last field.
    #[error("unexpected trailing input: {0:?}")]
    TrailingInput(String),
}

/// Sweep errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Target size of zero.
    #[error("invalid target size: {0}")]
    InvalidSize(u32),

    /// Not enough resting quantity to fill the target.
    #[error("insufficient liquidity: need {required}, available {available}")]
    InsufficientLiquidity {
        /// Target size.
        required: u64,
        /// Quantity the book could supply.
        available: u64,
    },

    /// Cent total does not fit in a `u64`.
    #[error("sweep total overflowed at price {price}")]
    Overflow {
        /// Level being consumed when the total overflowed.
        price: Price,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, PricerError>;
