use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;

use triarb_core::TradeDirection;

use crate::client::ExchangeClient;
use crate::error::{ExchangeError, Result};
use crate::model::{OrderHandle, OrderStatus, RawDepth, SymbolInfo};

type DepthCallback = Box<dyn Fn(RawDepth) + Send + Sync>;

struct OrderRecord {
    status: OrderStatus,
}

/// In-memory exchange test double: deterministic fills, no network.
///
/// Implements [`ExchangeClient`] so the full pipeline (topology, ingest,
/// compute, gate, execute) can be driven end-to-end in integration tests
/// without a real exchange. Mirrors the simulator adapters already present
/// in this codebase (the `exchange-sim` bounded context and `gateway`'s
/// `adapters::simulator` pattern), collapsed to the handful of operations
/// the exchange client contract actually names.
///
/// Every market order fills immediately and in full at whatever price the
/// caller supplies: this double exists to exercise the engine's control
/// flow (submit -> poll -> FILLED), not to model latency or partial fills.
pub struct SimulatedExchange {
    catalogue: Mutex<Vec<SymbolInfo>>,
    subscribers: Mutex<HashMap<String, Vec<DepthCallback>>>,
    orders: Mutex<HashMap<String, OrderRecord>>,
    next_order_id: AtomicU64,
}

impl SimulatedExchange {
    pub fn new(catalogue: Vec<SymbolInfo>) -> Arc<Self> {
        Arc::new(Self {
            catalogue: Mutex::new(catalogue),
            subscribers: Mutex::new(HashMap::new()),
            orders: Mutex::new(HashMap::new()),
            next_order_id: AtomicU64::new(1),
        })
    }

    /// Push a depth update for `symbol` to every subscriber registered via
    /// `subscribe_depth`. Test-only driver: a real exchange pushes these
    /// from its own websocket thread.
    pub fn push_depth(&self, symbol: &str, depth: RawDepth) {
        let subscribers = self.subscribers.lock();
        if let Some(callbacks) = subscribers.get(symbol) {
            for callback in callbacks {
                callback(depth.clone());
            }
        }
    }

    /// Force a previously placed order into a terminal failure state, to
    /// exercise `Executor`'s trade-failure path in tests.
    pub fn fail_order(&self, order_id: &str, status: OrderStatus) {
        if let Some(record) = self.orders.lock().get_mut(order_id) {
            record.status = status;
        }
    }
}

impl ExchangeClient for SimulatedExchange {
    fn exchange_info(&self) -> Result<Vec<SymbolInfo>> {
        Ok(self.catalogue.lock().clone())
    }

    fn subscribe_depth(&self, symbol: &str, _depth: usize, on_message: DepthCallback) -> Result<()> {
        self.subscribers
            .lock()
            .entry(symbol.to_string())
            .or_default()
            .push(on_message);
        Ok(())
    }

    fn market_order(&self, symbol: &str, _direction: TradeDirection, qty: Decimal) -> Result<OrderHandle> {
        if qty <= Decimal::ZERO {
            return Err(ExchangeError::Rejected(format!("non-positive quantity for {symbol}")));
        }
        let known = self.catalogue.lock().iter().any(|s| s.symbol == symbol);
        if !known {
            return Err(ExchangeError::UnknownSymbol(symbol.to_string()));
        }
        let id = self.next_order_id.fetch_add(1, Ordering::Relaxed);
        let order_id = format!("sim-{id}");
        self.orders.lock().insert(
            order_id.clone(),
            OrderRecord {
                status: OrderStatus::Filled,
            },
        );
        Ok(OrderHandle { order_id })
    }

    fn get_order(&self, _symbol: &str, order_id: &str) -> Result<OrderStatus> {
        self.orders
            .lock()
            .get(order_id)
            .map(|record| record.status)
            .ok_or_else(|| ExchangeError::OrderNotFound(order_id.to_string()))
    }

    fn ping(&self) -> Result<()> {
        Ok(())
    }
}
