//! Target-size pricing against the live book.
//!
//! This module handles:
//! - Best-first sweeps of one book side
//! - Incremental buy-expense / sell-income tracking
//! - Output quote formatting

pub mod fill;
pub mod pricer;
pub mod quote;

pub use fill::{calculate_fill, fill_from_book, FillInfo};
pub use pricer::{LiquidityPricer, PricingState, SidePricer};
pub use quote::{Action, Quote};
