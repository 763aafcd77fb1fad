use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rust_decimal::Decimal;

use triarb_core::{BookLevel, OrderBook};
use triarb_matrix::Matrix;

use crate::depth_queue::{DepthMessage, DepthQueue};

/// How long a worker blocks on the queue before re-checking the stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Parse the raw `[price, qty]` string pairs a `subscribeDepth` callback
/// delivers into typed, sorted, depth-bounded `BookLevel`s.
fn parse_levels(raw: &[(String, String)]) -> Vec<BookLevel> {
    raw.iter()
        .filter_map(|(price, qty)| {
            let price: Decimal = price.parse().ok()?;
            let qty: Decimal = qty.parse().ok()?;
            Some(BookLevel::new(price, qty))
        })
        .collect()
}

/// Pool of workers pulling `(symbol, ts, rawBook)` tuples from the depth
/// queue and updating `Matrix`.
///
/// Each worker loops: pop from the queue, parse the raw levels, call
/// `Matrix::update_pair`. On the stop signal a worker drains whatever is
/// still pending in the queue before exiting.
pub struct DepthIngest {
    handles: Vec<JoinHandle<()>>,
}

impl DepthIngest {
    pub fn spawn(
        worker_count: usize,
        depth: usize,
        queue: Arc<DepthQueue>,
        matrix: Arc<Matrix>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        let handles = (0..worker_count)
            .map(|id| {
                let queue = queue.clone();
                let matrix = matrix.clone();
                let stop = stop.clone();
                thread::Builder::new()
                    .name(format!("depth-ingest-{id}"))
                    .spawn(move || Self::run(queue, matrix, stop, depth))
                    .expect("failed to spawn depth-ingest worker")
            })
            .collect();
        Self { handles }
    }

    fn run(queue: Arc<DepthQueue>, matrix: Arc<Matrix>, stop: Arc<AtomicBool>, depth: usize) {
        while !stop.load(Ordering::Relaxed) {
            match queue.pop_timeout(POLL_INTERVAL) {
                Some(message) => Self::ingest_one(&matrix, message, depth),
                None => continue,
            }
        }
        for message in queue.drain() {
            Self::ingest_one(&matrix, message, depth);
        }
    }

    fn ingest_one(matrix: &Matrix, message: DepthMessage, depth: usize) {
        let DepthMessage { symbol, ts, raw } = message;
        let asks = parse_levels(&raw.asks);
        let bids = parse_levels(&raw.bids);
        let book = OrderBook::from_levels(asks, bids, depth, ts);
        if let Err(err) = matrix.update_pair(&symbol, book) {
            log::warn!("depth update for unregistered symbol {symbol}: {err}");
        }
    }

    /// Block until every worker has exited (they do, once `stop` is set and
    /// observed).
    pub fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}
