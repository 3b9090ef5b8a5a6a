//! Incremental order book pricer.
//!
//! Reads a log of limit order adds and reduces for one instrument and keeps
//! two running figures for a fixed target size:
//!
//! - the expense of buying the target by sweeping the asks (`B`)
//! - the income from selling the target into the bids (`S`)
//!
//! A line is written whenever either figure changes, or when the book can
//! no longer fill the target (`NA`).
//!
//! ```text
//! 28800758 A d B 44.18 157     ->  28800758 S 8832.56
//! 28800796 R d 157             ->  28800796 S NA
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`feed`]: Input parsing and the event loop
//! - [`metrics`]: Counters and latency histograms
//! - [`orderbook`]: Price-level books and order routing
//! - [`pricing`]: Target-size sweeps and quote emission
//! - [`utils`]: Utility functions

pub mod config;
pub mod error;
pub mod feed;
pub mod metrics;
pub mod orderbook;
pub mod pricing;
pub mod utils;

pub use config::Config;
pub use error::{ErrorCode, OrderError, PricerError, Result};
