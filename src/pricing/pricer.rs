//! Incremental target-size pricing driven by book mutations.

use std::marker::PhantomData;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace, warn};

use super::fill::fill_from_book;
use super::quote::{Action, Quote};
use crate::metrics;
use crate::orderbook::{
    Asks, BookController, BookObserver, BookSide, Bids, Mutation, Price, PriceLevelBook,
};

/// Per-side pricing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingState {
    /// Quantity every sweep tries to fill.
    pub target_size: u32,
    /// Last computed total; cleared when the target stops being fillable.
    pub last_result: Option<u64>,
    /// Deepest price consumed by the last sweep.
    pub worst_price_touched: Option<Price>,
    /// Whether the book could fill the target at the last check.
    pub fulfilled: bool,
}

impl PricingState {
    /// Fresh, not-fulfilled state.
    pub fn new(target_size: u32) -> Self {
        Self {
            target_size,
            last_result: None,
            worst_price_touched: None,
            fulfilled: false,
        }
    }
}

/// Prices one action by observing the book it consumes.
///
/// Emits a quote only when the total changes or the target flips between
/// fillable and not fillable.
pub struct SidePricer<S: BookSide> {
    action: Action,
    state: PricingState,
    quotes: UnboundedSender<Quote>,
    _side: PhantomData<S>,
}

impl<S: BookSide> SidePricer<S> {
    /// Create a pricer for the action that consumes side `S`.
    pub fn new(target_size: u32, quotes: UnboundedSender<Quote>) -> Self {
        Self {
            action: Action::priced_from(S::SIDE),
            state: PricingState::new(target_size),
            quotes,
            _side: PhantomData,
        }
    }

    /// Current state.
    pub fn state(&self) -> &PricingState {
        &self.state
    }

    /// Recompute after `mutation`; returns the quote to emit, if any.
    pub fn recompute(&mut self, book: &PriceLevelBook<S>, mutation: &Mutation<'_>) -> Option<Quote> {
        let target = u64::from(self.state.target_size);

        if book.total_quantity() < target {
            if !self.state.fulfilled {
                return None;
            }
            debug!(
                action = %self.action,
                available = book.total_quantity(),
                target,
                "target no longer fillable"
            );
            self.state.fulfilled = false;
            self.state.last_result = None;
            self.state.worst_price_touched = None;
            return Some(Quote::unavailable(mutation.timestamp, self.action));
        }

        if self.state.fulfilled {
            if let Some(worst) = self.state.worst_price_touched {
                if S::is_worse(mutation.price, worst) {
                    trace!(
                        action = %self.action,
                        price = %mutation.price,
                        worst = %worst,
                        "mutation behind last sweep, skipping"
                    );
                    metrics::inc_sweeps_pruned(self.action);
                    return None;
                }
            }
        }

        metrics::inc_sweeps(self.action);
        let fill = match fill_from_book(book, self.state.target_size) {
            Ok(fill) => fill,
            Err(err) => {
                warn!(action = %self.action, error = %err, "sweep failed");
                return None;
            }
        };

        self.state.worst_price_touched = Some(fill.worst_price);
        let changed = self.state.last_result != Some(fill.total_cost);
        self.state.last_result = Some(fill.total_cost);
        self.state.fulfilled = true;

        debug!(
            action = %self.action,
            total = fill.total_cost,
            worst = %fill.worst_price,
            levels = fill.levels_touched,
            changed,
            "sweep complete"
        );

        changed.then(|| Quote::priced(mutation.timestamp, self.action, fill.total_cost))
    }
}

impl<S: BookSide> BookObserver<S> for SidePricer<S> {
    fn on_mutation(&mut self, book: &PriceLevelBook<S>, mutation: &Mutation<'_>) {
        if let Some(quote) = self.recompute(book, mutation) {
            if self.quotes.send(quote).is_err() {
                warn!(action = %self.action, "quote receiver dropped");
            }
        }
    }
}

/// Buy-expense and sell-income pricing for one instrument.
///
/// Registers a [`SidePricer`] on each book of a [`BookController`]; after
/// that it is driven entirely by book mutations. Quotes are queued and
/// read with [`LiquidityPricer::drain`].
#[derive(Debug)]
pub struct LiquidityPricer {
    target_size: u32,
    quotes: UnboundedReceiver<Quote>,
}

impl LiquidityPricer {
    /// Attach pricing for `target_size` units to both books.
    pub fn attach(controller: &mut BookController, target_size: u32) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        controller
            .asks_mut()
            .register_observer(Box::new(SidePricer::<Asks>::new(target_size, tx.clone())));
        controller
            .bids_mut()
            .register_observer(Box::new(SidePricer::<Bids>::new(target_size, tx)));
        debug!(target_size, "pricer attached");
        Self {
            target_size,
            quotes: rx,
        }
    }

    /// Target size every sweep fills.
    pub fn target_size(&self) -> u32 {
        self.target_size
    }

    /// Take the quotes emitted since the last call, oldest first.
    pub fn drain(&mut self) -> Vec<Quote> {
        let mut drained = Vec::new();
        while let Ok(quote) = self.quotes.try_recv() {
            drained.push(quote);
        }
        drained
    }
}
