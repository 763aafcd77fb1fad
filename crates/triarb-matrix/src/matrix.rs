use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;

use triarb_clock::Clock;
use triarb_core::{Cycle, CycleId, OrderBook};

use crate::error::{MatrixError, Result};
use crate::running_stats::{RunningStats, StatsSummary, DEFAULT_WINDOW};

struct BookEntry {
    book: OrderBook,
    #[allow(dead_code)]
    step: Decimal,
}

/// Thread-safe mapping `symbol -> OrderBook`, plus a registry of `Cycle`s
/// and a rolling statistics accumulator over cycle-evaluation ages.
///
/// Concurrency: a single reader-writer lock guards the books map; updates
/// take the writer, `snapshot`/`create_cycle` take the reader. `RunningStats`
/// is guarded by its own mutex and is never held across I/O. This mirrors
/// the single-lock-per-shard discipline this workspace already uses for its
/// order-book shards, generalized from "one lock per shard of symbols" to
/// "one lock for the whole matrix" since every cycle shares the same O(D)
/// critical section on evaluation.
pub struct Matrix {
    books: RwLock<HashMap<String, BookEntry>>,
    cycles: RwLock<HashMap<CycleId, Cycle>>,
    stats: Mutex<RunningStats>,
    clock: Arc<dyn Clock>,
}

impl Matrix {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            books: RwLock::new(HashMap::new()),
            cycles: RwLock::new(HashMap::new()),
            stats: Mutex::new(RunningStats::new(DEFAULT_WINDOW)),
            clock,
        }
    }

    /// Idempotent: the first call registers an empty book and records
    /// `step`; later calls for the same symbol are no-ops.
    pub fn create_pair(&self, symbol: &str, step: Decimal) {
        let mut books = self.books.write();
        books.entry(symbol.to_string()).or_insert_with(|| BookEntry {
            book: OrderBook::empty(self.clock.now()),
            step,
        });
    }

    /// Registers a `Cycle` for later lookup. Requires all three symbols it
    /// references to already be registered via `create_pair`.
    pub fn create_cycle(&self, cycle: Cycle) -> Result<()> {
        {
            let books = self.books.read();
            for symbol in cycle.symbols() {
                if !books.contains_key(symbol) {
                    return Err(MatrixError::CycleSymbolNotRegistered {
                        cycle: cycle.id.to_string(),
                        symbol: symbol.to_string(),
                    });
                }
            }
        }
        let mut cycles = self.cycles.write();
        cycles.insert(cycle.id.clone(), cycle);
        Ok(())
    }

    /// Atomically replaces the book for `symbol`. Tolerates out-of-order
    /// delivery: if `book.timestamp` is not newer than the currently stored
    /// timestamp, the update is dropped.
    pub fn update_pair(&self, symbol: &str, book: OrderBook) -> Result<()> {
        let mut books = self.books.write();
        let entry = books
            .get_mut(symbol)
            .ok_or_else(|| MatrixError::UnknownSymbol(symbol.to_string()))?;

        if book.timestamp <= entry.book.timestamp {
            log::debug!(
                "dropping stale update for {symbol}: incoming={:?} current={:?}",
                book.timestamp,
                entry.book.timestamp
            );
            return Ok(());
        }
        entry.book = book;
        Ok(())
    }

    /// Returns a consistent triple: the three books referenced by `cycle_id`,
    /// all read under a single critical section so they refer to the same
    /// matrix version, plus the minimum of their three timestamps.
    pub fn snapshot(&self, cycle_id: &CycleId) -> Result<(Cycle, [OrderBook; 3], triarb_core::Timestamp)> {
        let cycles = self.cycles.read();
        let cycle = cycles
            .get(cycle_id)
            .ok_or_else(|| MatrixError::UnknownCycle(cycle_id.to_string()))?
            .clone();
        drop(cycles);

        let books = self.books.read();
        let symbols = cycle.symbols();
        let mut fetched: Vec<OrderBook> = Vec::with_capacity(3);
        let mut min_ts = None;
        for symbol in symbols {
            let entry = books
                .get(symbol)
                .ok_or_else(|| MatrixError::UnknownSymbol(symbol.to_string()))?;
            min_ts = Some(match min_ts {
                None => entry.book.timestamp,
                Some(current) if entry.book.timestamp < current => entry.book.timestamp,
                Some(current) => current,
            });
            fetched.push(entry.book.clone());
        }
        drop(books);

        let ts = min_ts.expect("cycle always has exactly three symbols");
        let triple: [OrderBook; 3] = fetched
            .try_into()
            .expect("cycle always has exactly three symbols");
        Ok((cycle, triple, ts))
    }

    /// The current book for a single registered symbol, or `None` if the
    /// symbol was never created. For observability and tests; the hot path
    /// (`ComputeLoop`) always goes through `snapshot` for its consistent
    /// three-book read.
    pub fn book(&self, symbol: &str) -> Option<OrderBook> {
        self.books.read().get(symbol).map(|entry| entry.book.clone())
    }

    pub fn record_age(&self, age_ms: f64) {
        self.stats.lock().record(age_ms);
    }

    pub fn age_summary(&self) -> StatsSummary {
        self.stats.lock().summary()
    }

    pub fn registered_symbols(&self) -> Vec<String> {
        self.books.read().keys().cloned().collect()
    }

    pub fn registered_cycle_ids(&self) -> Vec<CycleId> {
        self.cycles.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use triarb_clock::SteppableClock;
    use triarb_core::{Asset, BookLevel, TradingPair};

    fn pair(symbol: &str, base: &str, quote: &str) -> TradingPair {
        TradingPair::new(symbol, base, quote, 8, 2, Decimal::new(1, 5))
    }

    fn sample_cycle() -> Cycle {
        let start = pair("BTCUSDT", "BTC", "USDT");
        let middle = pair("ETHBTC", "ETH", "BTC");
        let end = pair("ETHUSDT", "ETH", "USDT");
        Cycle::new(Asset::from("USDT"), start, middle, end).unwrap()
    }

    fn setup() -> (Matrix, Arc<SteppableClock>, Cycle) {
        let clock = Arc::new(SteppableClock::new(Utc::now()));
        let matrix = Matrix::new(clock.clone());
        let cycle = sample_cycle();
        for symbol in cycle.symbols() {
            matrix.create_pair(symbol, Decimal::new(1, 5));
        }
        matrix.create_cycle(cycle.clone()).unwrap();
        (matrix, clock, cycle)
    }

    #[test]
    fn create_pair_is_idempotent() {
        let _ = env_logger::try_init();
        let (matrix, _clock, _cycle) = setup();
        matrix.create_pair("BTCUSDT", Decimal::new(999, 0));
        // second call must not clobber the first registration's step.
        assert_eq!(matrix.registered_symbols().len(), 3);
    }

    #[test]
    fn snapshot_returns_books_matching_action_tape() {
        let (matrix, _clock, cycle) = setup();
        let (got_cycle, books, _ts) = matrix.snapshot(&cycle.id).unwrap();
        assert_eq!(got_cycle.symbols(), cycle.symbols());
        assert_eq!(books.len(), 3);
    }

    #[test]
    fn stale_update_is_dropped() {
        let (matrix, clock, _cycle) = setup();
        let t0 = clock.now();
        let book_new = OrderBook::from_levels(
            vec![BookLevel::new(Decimal::from(10), Decimal::from(1))],
            vec![],
            5,
            t0 + Duration::milliseconds(10),
        );
        matrix.update_pair("BTCUSDT", book_new).unwrap();

        let stale = OrderBook::from_levels(
            vec![BookLevel::new(Decimal::from(999), Decimal::from(1))],
            vec![],
            5,
            t0 + Duration::milliseconds(5),
        );
        matrix.update_pair("BTCUSDT", stale).unwrap();

        let books = matrix.books.read();
        assert_eq!(
            books.get("BTCUSDT").unwrap().book.asks[0].price,
            Decimal::from(10)
        );
    }

    #[test]
    fn snapshot_timestamp_is_minimum_of_three() {
        let (matrix, clock, cycle) = setup();
        let t0 = clock.now();

        let mk = |ts_offset: i64| {
            OrderBook::from_levels(
                vec![BookLevel::new(Decimal::from(1), Decimal::from(1))],
                vec![BookLevel::new(Decimal::from(1), Decimal::from(1))],
                5,
                t0 + Duration::milliseconds(ts_offset),
            )
        };

        matrix.update_pair("BTCUSDT", mk(100)).unwrap();
        matrix.update_pair("ETHBTC", mk(50)).unwrap();
        matrix.update_pair("ETHUSDT", mk(200)).unwrap();

        let (_cycle, _books, ts) = matrix.snapshot(&cycle.id).unwrap();
        assert_eq!(ts, t0 + Duration::milliseconds(50));
    }

    #[test]
    fn create_cycle_rejects_unregistered_symbol() {
        let clock = Arc::new(SteppableClock::new(Utc::now()));
        let matrix = Matrix::new(clock);
        let cycle = sample_cycle();
        let err = matrix.create_cycle(cycle).unwrap_err();
        assert!(matches!(err, MatrixError::CycleSymbolNotRegistered { .. }));
    }
}
