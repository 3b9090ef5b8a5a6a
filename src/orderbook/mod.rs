//! Order book module for a single instrument.
//!
//! This module handles:
//! - Order, price and level types
//! - Single-side price-level books with mutation observers
//! - Routing of add/reduce events to the right side

pub mod book;
pub mod controller;
pub mod types;

pub use book::{AskBook, Asks, BidBook, Bids, BookObserver, BookSide, PriceLevelBook, Reduction};
pub use controller::{Applied, BookController};
pub use types::{
    cents_to_decimal, AddDetails, Mutation, MutationKind, Order, OrderDetails, OrderId, OrderKind,
    Price, PriceLevel, ReduceDetails, Side, PRICE_SCALE,
};
