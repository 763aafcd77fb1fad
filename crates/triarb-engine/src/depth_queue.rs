use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use triarb_core::Timestamp;
use triarb_exchange::RawDepth;

/// One pending depth update, coalesced by symbol.
#[derive(Debug, Clone)]
pub struct DepthMessage {
    pub symbol: String,
    pub ts: Timestamp,
    pub raw: RawDepth,
}

struct Inner {
    order: VecDeque<String>,
    pending: HashMap<String, DepthMessage>,
}

/// Bounded queue for `(symbol, ts, rawBook)` tuples feeding `DepthIngest`.
///
/// Backpressure: a newer book for a symbol that already
/// has a pending update strictly supersedes it (coalescing), since only the
/// latest book for a symbol is ever useful. If a genuinely new symbol
/// arrives while the queue already holds `capacity` distinct pending
/// symbols, the oldest pending symbol is evicted to make room. This can
/// only happen if the subscription set itself grows past `capacity`, which
/// does not occur in normal operation (the set is fixed by `Topology` at
/// startup).
pub struct DepthQueue {
    capacity: usize,
    inner: Mutex<Inner>,
    not_empty: Condvar,
}

impl DepthQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner {
                order: VecDeque::new(),
                pending: HashMap::new(),
            }),
            not_empty: Condvar::new(),
        }
    }

    /// Push an update, coalescing with any pending update for the same
    /// symbol.
    pub fn push(&self, message: DepthMessage) {
        let mut inner = self.inner.lock();
        if inner.pending.contains_key(&message.symbol) {
            inner.pending.insert(message.symbol.clone(), message);
            return;
        }
        if inner.order.len() >= self.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.pending.remove(&evicted);
            }
        }
        inner.order.push_back(message.symbol.clone());
        inner.pending.insert(message.symbol.clone(), message);
        drop(inner);
        self.not_empty.notify_one();
    }

    /// Pop the oldest pending symbol's update, waiting up to `timeout` for
    /// one to arrive. `None` on timeout (callers use this to re-check the
    /// stop flag rather than blocking forever).
    pub fn pop_timeout(&self, timeout: Duration) -> Option<DepthMessage> {
        let mut inner = self.inner.lock();
        if inner.order.is_empty() {
            let result = self.not_empty.wait_for(&mut inner, timeout);
            if result.timed_out() && inner.order.is_empty() {
                return None;
            }
        }
        let symbol = inner.order.pop_front()?;
        inner.pending.remove(&symbol)
    }

    /// Drain everything currently pending, in arrival order. Used by
    /// `DepthIngest` workers on shutdown: they drain the depth queue before
    /// exiting rather than discarding it.
    pub fn drain(&self) -> Vec<DepthMessage> {
        let mut inner = self.inner.lock();
        let mut out = Vec::with_capacity(inner.order.len());
        while let Some(symbol) = inner.order.pop_front() {
            if let Some(message) = inner.pending.remove(&symbol) {
                out.push(message);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
