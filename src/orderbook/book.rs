//! One side of the order book: price levels aggregated by order id.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::marker::PhantomData;

use tracing::trace;

use super::types::{Mutation, MutationKind, OrderId, Price, PriceLevel, Side};
use crate::error::BookError;

/// Price-priority policy for one side of the book.
///
/// Iterating the level map in `Key` order yields the best price first, so
/// "worse than" is simply "greater key".
pub trait BookSide: 'static {
    /// Map key giving best-first iteration.
    type Key: Ord + Copy + fmt::Debug;

    /// Side this policy orders.
    const SIDE: Side;

    /// Key for a price.
    fn key(price: Price) -> Self::Key;

    /// Price for a key.
    fn price(key: Self::Key) -> Price;

    /// Whether `candidate` sits strictly behind `reference` in priority.
    fn is_worse(candidate: Price, reference: Price) -> bool {
        Self::key(candidate) > Self::key(reference)
    }
}

/// Bid ordering: highest price first.
#[derive(Debug, Clone, Copy)]
pub enum Bids {}

/// Ask ordering: lowest price first.
#[derive(Debug, Clone, Copy)]
pub enum Asks {}

impl BookSide for Bids {
    type Key = Reverse<Price>;
    const SIDE: Side = Side::Bid;

    fn key(price: Price) -> Self::Key {
        Reverse(price)
    }

    fn price(key: Self::Key) -> Price {
        key.0
    }
}

impl BookSide for Asks {
    type Key = Price;
    const SIDE: Side = Side::Ask;

    fn key(price: Price) -> Self::Key {
        price
    }

    fn price(key: Self::Key) -> Price {
        key
    }
}

/// Receives every committed mutation of a [`PriceLevelBook`].
///
/// The book is passed back read-only so observers never need to hold a
/// reference to it.
pub trait BookObserver<S: BookSide> {
    /// Called synchronously after the change is applied.
    fn on_mutation(&mut self, book: &PriceLevelBook<S>, mutation: &Mutation<'_>);
}

/// Result of a successful reduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reduction {
    /// Price the reduced order rests (or rested) at.
    pub price: Price,
    /// Quantity actually removed.
    pub removed: u32,
    /// Quantity left on the order; zero means it was cancelled.
    pub remaining: u32,
}

/// Single-side price-level book.
///
/// Levels live in a `BTreeMap` keyed so that iteration is best-first; an
/// id index maps each resting order to its level price, and the book-wide
/// quantity is maintained incrementally.
pub struct PriceLevelBook<S: BookSide> {
    levels: BTreeMap<S::Key, PriceLevel>,
    index: HashMap<OrderId, Price>,
    total_quantity: u64,
    observers: Vec<Box<dyn BookObserver<S>>>,
    _side: PhantomData<S>,
}

/// Bid side book.
pub type BidBook = PriceLevelBook<Bids>;
/// Ask side book.
pub type AskBook = PriceLevelBook<Asks>;

impl<S: BookSide> Default for PriceLevelBook<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BookSide> fmt::Debug for PriceLevelBook<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceLevelBook")
            .field("side", &S::SIDE)
            .field("levels", &self.levels)
            .field("total_quantity", &self.total_quantity)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<S: BookSide> PriceLevelBook<S> {
    /// Create an empty book.
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
            index: HashMap::new(),
            total_quantity: 0,
            observers: Vec::new(),
            _side: PhantomData,
        }
    }

    /// Side this book holds.
    pub fn side(&self) -> Side {
        S::SIDE
    }

    /// Attach an observer. Observers are notified in registration order.
    pub fn register_observer(&mut self, observer: Box<dyn BookObserver<S>>) {
        self.observers.push(observer);
    }

    /// Rest `size` units of a new order at `price`.
    pub fn add(
        &mut self,
        timestamp: u32,
        id: OrderId,
        price: Price,
        size: u32,
    ) -> Result<(), BookError> {
        if self.index.contains_key(&id) {
            return Err(BookError::DuplicateId { id });
        }
        if size == 0 {
            return Err(BookError::ZeroQuantity { id });
        }

        self.levels
            .entry(S::key(price))
            .or_default()
            .insert(id.clone(), size);
        self.index.insert(id.clone(), price);
        self.total_quantity += u64::from(size);

        trace!(side = %S::SIDE, id = %id, price = %price, size, "order added");

        let mutation = Mutation {
            kind: MutationKind::Add,
            timestamp,
            id: &id,
            price,
            size,
            total_quantity: self.total_quantity,
        };
        self.notify(&mutation);
        Ok(())
    }

    /// Remove up to `amount` units from a resting order.
    ///
    /// Reducing by at least the remaining quantity cancels the order, and
    /// an emptied level is dropped.
    pub fn reduce(
        &mut self,
        timestamp: u32,
        id: &OrderId,
        amount: u32,
    ) -> Result<Reduction, BookError> {
        let price = *self
            .index
            .get(id)
            .ok_or_else(|| BookError::UnknownId { id: id.clone() })?;
        let key = S::key(price);

        let level = self
            .levels
            .get_mut(&key)
            .ok_or_else(|| BookError::UnknownId { id: id.clone() })?;
        let (removed, remaining) = level
            .reduce(id, amount)
            .ok_or_else(|| BookError::UnknownId { id: id.clone() })?;
        let level_empty = level.is_empty();

        if remaining == 0 {
            self.index.remove(id);
        }
        if level_empty {
            self.levels.remove(&key);
        }
        self.total_quantity -= u64::from(removed);

        trace!(side = %S::SIDE, id = %id, price = %price, removed, remaining, "order reduced");

        let mutation = Mutation {
            kind: MutationKind::Reduce,
            timestamp,
            id,
            price,
            size: removed,
            total_quantity: self.total_quantity,
        };
        self.notify(&mutation);
        Ok(Reduction {
            price,
            removed,
            remaining,
        })
    }

    /// Sum of all resting quantity.
    pub fn total_quantity(&self) -> u64 {
        self.total_quantity
    }

    /// Whether an id rests in this book.
    pub fn contains(&self, id: &OrderId) -> bool {
        self.index.contains_key(id)
    }

    /// Price an id rests at.
    pub fn price_of(&self, id: &OrderId) -> Option<Price> {
        self.index.get(id).copied()
    }

    /// Remaining quantity of an id.
    pub fn quantity_of(&self, id: &OrderId) -> Option<u32> {
        let price = self.price_of(id)?;
        self.levels.get(&S::key(price))?.quantity_of(id)
    }

    /// Level at an exact price.
    pub fn level(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&S::key(price))
    }

    /// Levels best-price-first.
    pub fn levels(&self) -> impl Iterator<Item = (Price, &PriceLevel)> {
        self.levels.iter().map(|(key, level)| (S::price(*key), level))
    }

    /// Best price, if any order rests.
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next().map(|key| S::price(*key))
    }

    /// Number of price levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Number of resting orders.
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    /// Whether no order rests.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    fn notify(&mut self, mutation: &Mutation<'_>) {
        let mut observers = std::mem::take(&mut self.observers);
        for observer in observers.iter_mut() {
            observer.on_mutation(self, mutation);
        }
        self.observers = observers;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn id(s: &str) -> OrderId {
        OrderId::new(s)
    }

    fn px(cents: u64) -> Price {
        Price::from_cents(cents)
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Seen {
        tag: &'static str,
        kind: MutationKind,
        id: String,
        price: Price,
        size: u32,
        total: u64,
        book_total: u64,
    }

    struct Recorder {
        tag: &'static str,
        seen: Arc<Mutex<Vec<Seen>>>,
    }

    impl<S: BookSide> BookObserver<S> for Recorder {
        fn on_mutation(&mut self, book: &PriceLevelBook<S>, m: &Mutation<'_>) {
            self.seen.lock().unwrap().push(Seen {
                tag: self.tag,
                kind: m.kind,
                id: m.id.to_string(),
                price: m.price,
                size: m.size,
                total: m.total_quantity,
                book_total: book.total_quantity(),
            });
        }
    }

    #[test]
    fn bids_iterate_highest_first() {
        let mut book = BidBook::new();
        book.add(1, id("a"), px(950), 10).unwrap();
        book.add(2, id("b"), px(1000), 10).unwrap();
        book.add(3, id("c"), px(900), 10).unwrap();

        let prices: Vec<_> = book.levels().map(|(p, _)| p).collect();
        assert_eq!(prices, vec![px(1000), px(950), px(900)]);
        assert_eq!(book.best_price(), Some(px(1000)));
        assert_eq!(book.side(), Side::Bid);
    }

    #[test]
    fn asks_iterate_lowest_first() {
        let mut book = AskBook::new();
        book.add(1, id("a"), px(505), 10).unwrap();
        book.add(2, id("b"), px(500), 10).unwrap();
        book.add(3, id("c"), px(510), 10).unwrap();

        let prices: Vec<_> = book.levels().map(|(p, _)| p).collect();
        assert_eq!(prices, vec![px(500), px(505), px(510)]);
        assert_eq!(book.best_price(), Some(px(500)));
    }

    #[test]
    fn worse_is_side_relative() {
        assert!(Bids::is_worse(px(900), px(950)));
        assert!(!Bids::is_worse(px(950), px(950)));
        assert!(!Bids::is_worse(px(1000), px(950)));
        assert!(Asks::is_worse(px(510), px(500)));
        assert!(!Asks::is_worse(px(500), px(500)));
        assert!(!Asks::is_worse(px(490), px(500)));
    }

    #[test]
    fn same_price_orders_share_a_level() {
        let mut book = BidBook::new();
        book.add(1, id("a"), px(1000), 100).unwrap();
        book.add(2, id("b"), px(1000), 50).unwrap();

        assert_eq!(book.depth(), 1);
        assert_eq!(book.order_count(), 2);
        let level = book.level(px(1000)).unwrap();
        assert_eq!(level.quantity(), 150);
        assert_eq!(level.order_count(), 2);
        assert_eq!(book.total_quantity(), 150);
    }

    #[test]
    fn duplicate_add_leaves_book_unchanged() {
        let mut book = AskBook::new();
        book.add(1, id("a"), px(500), 100).unwrap();

        let err = book.add(2, id("a"), px(600), 40).unwrap_err();
        assert_eq!(err, BookError::DuplicateId { id: id("a") });
        assert_eq!(book.total_quantity(), 100);
        assert_eq!(book.depth(), 1);
        assert_eq!(book.price_of(&id("a")), Some(px(500)));
        assert!(book.level(px(600)).is_none());
    }

    #[test]
    fn zero_size_add_is_rejected() {
        let mut book = AskBook::new();
        let err = book.add(1, id("a"), px(500), 0).unwrap_err();
        assert_eq!(err, BookError::ZeroQuantity { id: id("a") });
        assert!(book.is_empty());
        assert!(!book.contains(&id("a")));
    }

    #[test]
    fn partial_reduce_keeps_order_and_level() {
        let mut book = BidBook::new();
        book.add(1, id("a"), px(1000), 100).unwrap();

        let r = book.reduce(2, &id("a"), 30).unwrap();
        assert_eq!(
            r,
            Reduction {
                price: px(1000),
                removed: 30,
                remaining: 70
            }
        );
        assert_eq!(book.quantity_of(&id("a")), Some(70));
        assert_eq!(book.total_quantity(), 70);
        assert_eq!(book.depth(), 1);
    }

    #[test]
    fn full_reduce_removes_order_and_empty_level() {
        let mut book = BidBook::new();
        book.add(1, id("a"), px(1000), 100).unwrap();
        book.add(2, id("b"), px(950), 20).unwrap();

        let r = book.reduce(3, &id("a"), 500).unwrap();
        assert_eq!(r.removed, 100);
        assert_eq!(r.remaining, 0);
        assert!(!book.contains(&id("a")));
        assert!(book.level(px(1000)).is_none());
        assert_eq!(book.best_price(), Some(px(950)));
        assert_eq!(book.total_quantity(), 20);
    }

    #[test]
    fn full_reduce_keeps_shared_level() {
        let mut book = AskBook::new();
        book.add(1, id("a"), px(500), 100).unwrap();
        book.add(2, id("b"), px(500), 25).unwrap();

        book.reduce(3, &id("a"), 100).unwrap();
        let level = book.level(px(500)).unwrap();
        assert_eq!(level.quantity(), 25);
        assert_eq!(level.order_count(), 1);
        assert_eq!(book.total_quantity(), 25);
    }

    #[test]
    fn unknown_reduce_is_rejected() {
        let mut book = AskBook::new();
        book.add(1, id("a"), px(500), 100).unwrap();

        let err = book.reduce(2, &id("zz"), 10).unwrap_err();
        assert_eq!(err, BookError::UnknownId { id: id("zz") });
        assert_eq!(book.total_quantity(), 100);
    }

    #[test]
    fn reduced_id_can_be_added_again() {
        let mut book = BidBook::new();
        book.add(1, id("a"), px(1000), 10).unwrap();
        book.reduce(2, &id("a"), 10).unwrap();
        book.add(3, id("a"), px(990), 5).unwrap();
        assert_eq!(book.price_of(&id("a")), Some(px(990)));
        assert_eq!(book.total_quantity(), 5);
    }

    #[test]
    fn total_quantity_is_conserved() {
        let mut book = BidBook::new();
        let mut expected: u64 = 0;
        for (i, size) in [100u32, 40, 7, 250, 1].into_iter().enumerate() {
            book.add(i as u32, id(&format!("o{i}")), px(900 + (i as u64 % 2) * 10), size)
                .unwrap();
            expected += u64::from(size);
            assert_eq!(book.total_quantity(), expected);
        }
        for (i, amount) in [30u32, 100, 7, 1000].into_iter().enumerate() {
            let r = book.reduce(10 + i as u32, &id(&format!("o{i}")), amount).unwrap();
            expected -= u64::from(r.removed);
            assert_eq!(book.total_quantity(), expected);
        }
        let level_sum: u64 = book.levels().map(|(_, l)| l.quantity()).sum();
        assert_eq!(level_sum, book.total_quantity());
    }

    #[test]
    fn observers_see_committed_state_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut book = AskBook::new();
        book.register_observer(Box::new(Recorder {
            tag: "first",
            seen: seen.clone(),
        }));
        book.register_observer(Box::new(Recorder {
            tag: "second",
            seen: seen.clone(),
        }));

        book.add(1, id("a"), px(500), 100).unwrap();
        book.reduce(2, &id("a"), 150).unwrap();
        let _ = book.reduce(3, &id("a"), 1);

        let seen = seen.lock().unwrap().clone();
        let add = |tag| Seen {
            tag,
            kind: MutationKind::Add,
            id: "a".into(),
            price: px(500),
            size: 100,
            total: 100,
            book_total: 100,
        };
        let reduce = |tag| Seen {
            tag,
            kind: MutationKind::Reduce,
            id: "a".into(),
            price: px(500),
            size: 100,
            total: 0,
            book_total: 0,
        };
        assert_eq!(
            seen,
            vec![add("first"), add("second"), reduce("first"), reduce("second")]
        );
    }
}
