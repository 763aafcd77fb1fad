use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{Price, Quantity, Timestamp};

/// One price/quantity rung of an order book side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub quantity: Quantity,
}

impl BookLevel {
    pub fn new(price: Price, quantity: Quantity) -> Self {
        Self { price, quantity }
    }
}

/// A per-symbol top-N snapshot of asks and bids plus the wall-clock time it
/// was ingested.
///
/// `asks` is sorted strictly ascending by price (best ask first); `bids` is
/// sorted strictly descending (best bid first). Both are bounded to a
/// configured depth. When both sides are non-empty, `bids[0].price <
/// asks[0].price` (the book is not crossed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBook {
    pub asks: Vec<BookLevel>,
    pub bids: Vec<BookLevel>,
    pub timestamp: Timestamp,
}

impl OrderBook {
    /// An empty book, as registered by `Matrix::create_pair` before the
    /// first update arrives.
    pub fn empty(timestamp: Timestamp) -> Self {
        Self {
            asks: Vec::new(),
            bids: Vec::new(),
            timestamp,
        }
    }

    /// Build a book from raw (unsorted, possibly over-depth) levels, sorting
    /// each side into its canonical order and truncating to `depth` levels.
    /// Levels with non-positive price or negative quantity are dropped.
    pub fn from_levels(
        mut asks: Vec<BookLevel>,
        mut bids: Vec<BookLevel>,
        depth: usize,
        timestamp: Timestamp,
    ) -> Self {
        asks.retain(|l| l.price > Decimal::ZERO && l.quantity >= Decimal::ZERO);
        bids.retain(|l| l.price > Decimal::ZERO && l.quantity >= Decimal::ZERO);

        asks.sort_by(|a, b| a.price.cmp(&b.price));
        bids.sort_by(|a, b| b.price.cmp(&a.price));

        asks.truncate(depth);
        bids.truncate(depth);

        Self {
            asks,
            bids,
            timestamp,
        }
    }

    pub fn best_ask(&self) -> Option<&BookLevel> {
        self.asks.first()
    }

    pub fn best_bid(&self) -> Option<&BookLevel> {
        self.bids.first()
    }

    /// `true` if both sides are non-empty and the book is internally
    /// consistent (`bids[0].price < asks[0].price`).
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid.price >= ask.price,
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.asks.is_empty() && self.bids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lvl(p: i64, q: i64) -> BookLevel {
        BookLevel::new(Decimal::from(p), Decimal::from(q))
    }

    #[test]
    fn from_levels_sorts_and_truncates() {
        let asks = vec![lvl(105, 1), lvl(101, 1), lvl(103, 1), lvl(102, 1)];
        let bids = vec![lvl(95, 1), lvl(99, 1), lvl(97, 1)];
        let book = OrderBook::from_levels(asks, bids, 2, Utc::now());

        assert_eq!(book.asks.len(), 2);
        assert_eq!(book.asks[0].price, Decimal::from(101));
        assert_eq!(book.asks[1].price, Decimal::from(102));

        assert_eq!(book.bids.len(), 2);
        assert_eq!(book.bids[0].price, Decimal::from(99));
        assert_eq!(book.bids[1].price, Decimal::from(97));
    }

    #[test]
    fn from_levels_drops_invalid_rungs() {
        let asks = vec![lvl(0, 1), lvl(-5, 1), lvl(10, 1)];
        let book = OrderBook::from_levels(asks, vec![], 10, Utc::now());
        assert_eq!(book.asks.len(), 1);
        assert_eq!(book.asks[0].price, Decimal::from(10));
    }

    #[test]
    fn not_crossed_when_bid_below_ask() {
        let book = OrderBook::from_levels(vec![lvl(101, 1)], vec![lvl(100, 1)], 10, Utc::now());
        assert!(!book.is_crossed());
    }
}
