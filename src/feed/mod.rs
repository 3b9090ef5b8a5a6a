//! Order log input.
//!
//! This module handles:
//! - Parsing add/reduce lines into orders
//! - The read-apply-emit loop over async input and output

pub mod parser;
pub mod runner;

pub use parser::parse_order;
pub use runner::{run, PricingEngine, RunStats};
