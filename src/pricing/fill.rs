//! Target-size fill calculation by walking a book best-price-first.

use crate::error::PricingError;
use crate::orderbook::{BookSide, Price, PriceLevelBook};

/// Result of sweeping a book for a target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillInfo {
    /// Size filled; always the target on success.
    pub filled_size: u64,
    /// Sum of `price * quantity` over the consumed levels, in cents.
    pub total_cost: u64,
    /// Deepest price consumed.
    pub worst_price: Price,
    /// First price consumed.
    pub best_price: Price,
    /// Number of levels touched.
    pub levels_touched: usize,
}

/// Walk `levels` (best first) until `target_size` is filled.
///
/// Each item is a level price and its aggregated quantity.
pub fn calculate_fill<I>(levels: I, target_size: u32) -> Result<FillInfo, PricingError>
where
    I: IntoIterator<Item = (Price, u64)>,
{
    if target_size == 0 {
        return Err(PricingError::InvalidSize(target_size));
    }

    let target = u64::from(target_size);
    let mut remaining = target;
    let mut total_cost: u64 = 0;
    let mut best_price = None;
    let mut worst_price = None;
    let mut levels_touched = 0;

    for (price, quantity) in levels {
        if remaining == 0 {
            break;
        }
        if quantity == 0 {
            continue;
        }

        let fill_size = remaining.min(quantity);
        total_cost = price
            .cents()
            .checked_mul(fill_size)
            .and_then(|cost| total_cost.checked_add(cost))
            .ok_or(PricingError::Overflow { price })?;
        remaining -= fill_size;
        best_price.get_or_insert(price);
        worst_price = Some(price);
        levels_touched += 1;
    }

    match (remaining, best_price, worst_price) {
        (0, Some(best_price), Some(worst_price)) => Ok(FillInfo {
            filled_size: target,
            total_cost,
            worst_price,
            best_price,
            levels_touched,
        }),
        _ => Err(PricingError::InsufficientLiquidity {
            required: target,
            available: target - remaining,
        }),
    }
}

/// Sweep one side of the book.
pub fn fill_from_book<S: BookSide>(
    book: &PriceLevelBook<S>,
    target_size: u32,
) -> Result<FillInfo, PricingError> {
    calculate_fill(
        book.levels().map(|(price, level)| (price, level.quantity())),
        target_size,
    )
}
