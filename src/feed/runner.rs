//! Event loop: read order lines, apply them, write quotes.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

use super::parser::parse_order;
use crate::error::{OrderError, ParseError, Result};
use crate::metrics;
use crate::orderbook::{Applied, BookController};
use crate::pricing::{LiquidityPricer, Quote};

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Non-blank lines read.
    pub lines: u64,
    /// Orders applied to the book.
    pub processed: u64,
    /// Lines rejected with an error code.
    pub rejected: u64,
    /// Quotes written.
    pub quotes: u64,
}

/// Book plus pricer for one instrument.
#[derive(Debug)]
pub struct PricingEngine {
    controller: BookController,
    pricer: LiquidityPricer,
}

impl PricingEngine {
    /// Empty book priced for `target_size` units.
    pub fn new(target_size: u32) -> Self {
        let mut controller = BookController::new();
        let pricer = LiquidityPricer::attach(&mut controller, target_size);
        Self { controller, pricer }
    }

    /// Parse and apply one line; returns the quotes it produced.
    pub fn handle_line(&mut self, line: &str) -> std::result::Result<Vec<Quote>, OrderError> {
        let order = parse_order(line)?;
        let kind = order.kind();
        let applied = self.controller.process(order)?;
        metrics::inc_orders_processed(kind);
        log_applied(&applied);
        Ok(self.pricer.drain())
    }

    /// Read-only view of the book.
    pub fn book(&self) -> &BookController {
        &self.controller
    }

    /// Target size being priced.
    pub fn target_size(&self) -> u32 {
        self.pricer.target_size()
    }
}

/// Decode one raw line, without its terminator.
fn decode_line(raw: &[u8]) -> std::result::Result<&str, ParseError> {
    std::str::from_utf8(raw).map_err(|e| ParseError::InvalidUtf8(e.valid_up_to()))
}

fn log_applied(applied: &Applied) {
    debug!(
        kind = %applied.kind,
        side = %applied.side,
        price = %applied.price,
        size = applied.size,
        "order applied"
    );
}

/// Drive the engine until `input` is exhausted or `shutdown` resolves.
///
/// Output is flushed after every event that produced quotes. Per-line
/// failures, undecodable bytes included, are logged and counted; only
/// I/O errors end the run early.
#[instrument(skip_all, fields(target_size = target_size))]
pub async fn run<R, W, F>(
    mut input: R,
    output: &mut W,
    target_size: u32,
    shutdown: F,
) -> Result<RunStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    let mut engine = PricingEngine::new(target_size);
    let mut stats = RunStats::default();
    let mut buf = Vec::new();
    tokio::pin!(shutdown);

    info!(target_size, "pricer started");

    loop {
        buf.clear();
        let read = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            read = input.read_until(b'\n', &mut buf) => read?,
        };
        if read == 0 {
            break;
        }

        let result = match decode_line(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => {
                stats.lines += 1;
                let _timer = metrics::timer_event();
                engine.handle_line(line)
            }
            Err(err) => {
                stats.lines += 1;
                Err(OrderError::from(err))
            }
        };

        match result {
            Ok(quotes) => {
                stats.processed += 1;
                if quotes.is_empty() {
                    continue;
                }
                for quote in &quotes {
                    output.write_all(format!("{quote}\n").as_bytes()).await?;
                    metrics::inc_quotes_emitted(quote.action);
                }
                output.flush().await?;
                stats.quotes += quotes.len() as u64;
            }
            Err(err) => {
                let code = err.code();
                stats.rejected += 1;
                metrics::inc_orders_rejected(code);
                let line = String::from_utf8_lossy(&buf);
                warn!(code = %code, error = %err, line = %line.trim(), "{}", code.message());
            }
        }
    }

    output.flush().await?;
    info!(
        lines = stats.lines,
        processed = stats.processed,
        rejected = stats.rejected,
        quotes = stats.quotes,
        "pricer stopped"
    );
    Ok(stats)
}
