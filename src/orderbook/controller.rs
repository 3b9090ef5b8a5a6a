//! Routes parsed orders to the bid or ask book.

use tracing::debug;

use super::book::{AskBook, BidBook};
use super::types::{Order, OrderDetails, OrderKind, Price, Side};
use crate::error::{BookError, OrderError};

/// What a successfully processed order did to the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    /// Event kind.
    pub kind: OrderKind,
    /// Side that was mutated.
    pub side: Side,
    /// Level price; for a Reduce this is resolved from the book.
    pub price: Price,
    /// Quantity added or actually removed.
    pub size: u32,
}

/// Owns both sides of the book for a single instrument.
#[derive(Debug, Default)]
pub struct BookController {
    bids: BidBook,
    asks: AskBook,
}

impl BookController {
    /// Create a controller with two empty books.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one order.
    ///
    /// Adds go to the side they declare. Reduces are resolved by id, bid
    /// side first.
    pub fn process(&mut self, order: Order) -> Result<Applied, OrderError> {
        let Order {
            timestamp,
            id,
            size,
            details,
        } = order;

        match details {
            OrderDetails::Add(add) => {
                let other_side_holds = match add.side {
                    Side::Bid => self.asks.contains(&id),
                    Side::Ask => self.bids.contains(&id),
                };
                if other_side_holds {
                    return Err(OrderError::AddFailed {
                        source: BookError::DuplicateId { id: id.clone() },
                        id,
                    });
                }

                let result = match add.side {
                    Side::Bid => self.bids.add(timestamp, id.clone(), add.limit_price, size),
                    Side::Ask => self.asks.add(timestamp, id.clone(), add.limit_price, size),
                };
                result.map_err(|source| OrderError::AddFailed { id, source })?;

                Ok(Applied {
                    kind: OrderKind::Add,
                    side: add.side,
                    price: add.limit_price,
                    size,
                })
            }
            OrderDetails::Reduce(_) => {
                let (side, reduction) = if self.bids.contains(&id) {
                    (Side::Bid, self.bids.reduce(timestamp, &id, size))
                } else if self.asks.contains(&id) {
                    (Side::Ask, self.asks.reduce(timestamp, &id, size))
                } else {
                    debug!(id = %id, "reduce for unknown order");
                    return Err(OrderError::ReduceFailed { id });
                };
                let reduction = reduction.map_err(|_| OrderError::ReduceFailed { id })?;

                Ok(Applied {
                    kind: OrderKind::Reduce,
                    side,
                    price: reduction.price,
                    size: reduction.removed,
                })
            }
        }
    }

    /// Bid side, read-only.
    pub fn bids(&self) -> &BidBook {
        &self.bids
    }

    /// Ask side, read-only.
    pub fn asks(&self) -> &AskBook {
        &self.asks
    }

    /// Bid side, for observer registration.
    pub fn bids_mut(&mut self) -> &mut BidBook {
        &mut self.bids
    }

    /// Ask side, for observer registration.
    pub fn asks_mut(&mut self) -> &mut AskBook {
        &mut self.asks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::orderbook::OrderId;
    use pretty_assertions::assert_eq;

    fn px(cents: u64) -> Price {
        Price::from_cents(cents)
    }

    #[test]
    fn add_routes_by_declared_side() {
        let mut controller = BookController::new();
        controller
            .process(Order::add(1, "b1", Side::Bid, px(1000), 150))
            .unwrap();
        controller
            .process(Order::add(2, "a1", Side::Ask, px(1010), 30))
            .unwrap();

        assert_eq!(controller.bids().total_quantity(), 150);
        assert_eq!(controller.asks().total_quantity(), 30);
        assert!(controller.bids().contains(&OrderId::new("b1")));
        assert!(controller.asks().contains(&OrderId::new("a1")));
    }

    #[test]
    fn reduce_reports_resolved_price() {
        let mut controller = BookController::new();
        controller
            .process(Order::add(1, "a1", Side::Ask, px(505), 100))
            .unwrap();

        let applied = controller.process(Order::reduce(2, "a1", 40)).unwrap();
        assert_eq!(
            applied,
            Applied {
                kind: OrderKind::Reduce,
                side: Side::Ask,
                price: px(505),
                size: 40,
            }
        );
    }

    #[test]
    fn reduce_reports_quantity_actually_removed() {
        let mut controller = BookController::new();
        controller
            .process(Order::add(1, "b1", Side::Bid, px(1000), 20))
            .unwrap();

        let applied = controller.process(Order::reduce(2, "b1", 500)).unwrap();
        assert_eq!(applied.size, 20);
        assert_eq!(controller.bids().order_count(), 0);
    }

    #[test]
    fn duplicate_add_fails_on_either_side() {
        let mut controller = BookController::new();
        controller
            .process(Order::add(1, "x", Side::Bid, px(1000), 10))
            .unwrap();

        let same_side = controller
            .process(Order::add(2, "x", Side::Bid, px(990), 5))
            .unwrap_err();
        assert_eq!(same_side.code(), ErrorCode::AddFailed);

        let other_side = controller
            .process(Order::add(3, "x", Side::Ask, px(1100), 5))
            .unwrap_err();
        assert_eq!(other_side.code(), ErrorCode::AddFailed);

        assert_eq!(controller.bids().total_quantity(), 10);
        assert_eq!(controller.asks().total_quantity(), 0);
        assert_eq!(controller.bids().price_of(&OrderId::new("x")), Some(px(1000)));
    }

    #[test]
    fn unknown_reduce_fails_and_changes_nothing() {
        let mut controller = BookController::new();
        controller
            .process(Order::add(1, "b1", Side::Bid, px(1000), 10))
            .unwrap();

        let err = controller.process(Order::reduce(2, "nope", 5)).unwrap_err();
        assert_eq!(
            err,
            OrderError::ReduceFailed {
                id: OrderId::new("nope")
            }
        );
        assert_eq!(err.code(), ErrorCode::ReduceFailed);
        assert_eq!(controller.bids().total_quantity(), 10);
    }

    #[test]
    fn zero_size_add_maps_to_add_failed() {
        let mut controller = BookController::new();
        let err = controller
            .process(Order::add(1, "z", Side::Ask, px(500), 0))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AddFailed);
    }
}
