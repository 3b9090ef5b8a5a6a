//! Counters and latency histograms for the event loop.
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! every call is a no-op.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

use crate::error::ErrorCode;
use crate::orderbook::OrderKind;
use crate::pricing::Action;

// === Metric Name Constants ===

/// Orders applied to the book.
pub const METRIC_ORDERS_PROCESSED: &str = "orders_processed_total";
/// Orders rejected with an error code.
pub const METRIC_ORDERS_REJECTED: &str = "orders_rejected_total";
/// Quotes written to the output.
pub const METRIC_QUOTES_EMITTED: &str = "quotes_emitted_total";
/// Full book sweeps performed.
pub const METRIC_BOOK_SWEEPS: &str = "book_sweeps_total";
/// Sweeps skipped because the mutation was behind the last sweep.
pub const METRIC_BOOK_SWEEPS_PRUNED: &str = "book_sweeps_pruned_total";
/// Per-event processing latency.
pub const METRIC_EVENT_LATENCY: &str = "event_processing_latency_us";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_ORDERS_PROCESSED, "Total number of orders applied");
    describe_counter!(
        METRIC_ORDERS_REJECTED,
        "Total number of orders rejected, by error code"
    );
    describe_counter!(METRIC_QUOTES_EMITTED, "Total number of quotes emitted");
    describe_counter!(METRIC_BOOK_SWEEPS, "Total number of book sweeps");
    describe_counter!(
        METRIC_BOOK_SWEEPS_PRUNED,
        "Total number of sweeps skipped by the worst-price rule"
    );
    describe_histogram!(
        METRIC_EVENT_LATENCY,
        "Time to parse, apply and price one event in microseconds"
    );

    debug!("Metrics initialized");
}

/// Increment processed orders counter.
pub fn inc_orders_processed(kind: OrderKind) {
    counter!(METRIC_ORDERS_PROCESSED, "kind" => kind.to_string()).increment(1);
}

/// Increment rejected orders counter.
pub fn inc_orders_rejected(code: ErrorCode) {
    counter!(METRIC_ORDERS_REJECTED, "code" => code.to_string()).increment(1);
}

/// Increment emitted quotes counter.
pub fn inc_quotes_emitted(action: Action) {
    counter!(METRIC_QUOTES_EMITTED, "action" => action.label()).increment(1);
}

/// Increment book sweeps counter.
pub fn inc_sweeps(action: Action) {
    counter!(METRIC_BOOK_SWEEPS, "action" => action.label()).increment(1);
}

/// Increment pruned sweeps counter.
pub fn inc_sweeps_pruned(action: Action) {
    counter!(METRIC_BOOK_SWEEPS_PRUNED, "action" => action.label()).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in microseconds (without recording).
    pub fn elapsed_us(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1_000_000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(self.metric_name).record(self.elapsed_us());
    }
}

/// Create a latency timer for one input event.
pub fn timer_event() -> LatencyTimer {
    LatencyTimer::new(METRIC_EVENT_LATENCY)
}
