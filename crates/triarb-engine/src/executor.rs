use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use triarb_clock::Clock;
use triarb_core::Deal;
use triarb_exchange::{ExchangeClient, ExchangeError};
use triarb_notify::Notifier;

use crate::error::ExecutorError;

/// How many times `get_order` may return "not found" before a leg gives up.
/// Polling uses a bounded retry to tolerate the exchange's immediate-
/// consistency lag after an order is placed.
const MAX_POLL_ATTEMPTS: u32 = 20;
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Serializes accepted deals, enforces the execution cap, and places each
/// deal's three market orders in order, waiting for each to be `FILLED`
/// before the next.
///
/// A single instance is shared by every `ComputeLoop` worker. The mutex is
/// held across network I/O (order submission and status polling): at most
/// one deal is ever in flight, which is what makes `count` an exact, not
/// approximate, bound on executed deals.
pub struct Executor {
    mutex: Mutex<()>,
    count: AtomicU64,
    cap: Option<u64>,
    exchange: Arc<dyn ExchangeClient>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

/// Successful result of executing all three legs of a deal.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub deal: Deal,
    pub order_ids: [String; 3],
}

impl Executor {
    pub fn new(
        cap: Option<u64>,
        exchange: Arc<dyn ExchangeClient>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            mutex: Mutex::new(()),
            count: AtomicU64::new(0),
            cap,
            exchange,
            notifier,
            clock,
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    fn cap_reached(&self, observed: u64) -> bool {
        matches!(self.cap, Some(cap) if observed >= cap)
    }

    /// Submit `deal` for execution. Serialized by `mutex`: only one deal
    /// executes at a time. Returns `RejectedCap` without any side effect if
    /// the cap was already reached, either before or after acquiring the
    /// lock. The budget is reserved optimistically, before dispatching any
    /// leg, so a trade failure does not refund it.
    pub fn submit(&self, deal: Deal) -> Result<ExecutionReport, ExecutorError> {
        if self.cap_reached(self.count()) {
            return Err(ExecutorError::RejectedCap(deal.cycle_id.clone()));
        }

        let _guard = self.mutex.lock();

        if self.cap_reached(self.count()) {
            return Err(ExecutorError::RejectedCap(deal.cycle_id.clone()));
        }
        self.count.fetch_add(1, Ordering::SeqCst);

        let age = self
            .clock
            .now()
            .signed_duration_since(deal.timestamp)
            .to_std()
            .unwrap_or(Duration::ZERO);

        let mut order_ids: [String; 3] = Default::default();
        for (i, action) in deal.actions.iter().enumerate() {
            let handle = self
                .exchange
                .market_order(&action.symbol, action.direction, action.quantity)
                .map_err(|cause| ExecutorError::TradeFailed {
                    cycle: deal.cycle_id.clone(),
                    leg: i,
                    cause,
                })?;

            self.poll_until_filled(&action.symbol, &handle.order_id, i, &deal)?;
            order_ids[i] = handle.order_id;
        }

        self.notifier.send_deal(&deal, age);
        Ok(ExecutionReport { deal, order_ids })
    }

    fn poll_until_filled(&self, symbol: &str, order_id: &str, leg: usize, deal: &Deal) -> Result<(), ExecutorError> {
        let mut attempts = 0;
        loop {
            match self.exchange.get_order(symbol, order_id) {
                Ok(status) if status.is_terminal_success() => return Ok(()),
                Ok(status) if status.is_terminal_failure() => {
                    return Err(ExecutorError::TradeFailed {
                        cycle: deal.cycle_id.clone(),
                        leg,
                        cause: ExchangeError::Rejected(format!("order reached terminal status {status:?}")),
                    });
                }
                Ok(_) => {
                    // NEW / PARTIALLY_FILLED: keep polling without counting
                    // against the not-found retry budget.
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(ExchangeError::OrderNotFound(_)) => {
                    attempts += 1;
                    if attempts >= MAX_POLL_ATTEMPTS {
                        return Err(ExecutorError::TradeFailed {
                            cycle: deal.cycle_id.clone(),
                            leg,
                            cause: ExchangeError::OrderNotFound(order_id.to_string()),
                        });
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(cause) => {
                    return Err(ExecutorError::TradeFailed {
                        cycle: deal.cycle_id.clone(),
                        leg,
                        cause,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Barrier;
    use std::thread;

    use triarb_clock::SystemClock;
    use triarb_core::{Action, CycleId, TradeDirection};
    use triarb_exchange::SymbolInfo;
    use triarb_notify::NoopNotifier;

    fn symbol_info(symbol: &str) -> SymbolInfo {
        SymbolInfo {
            symbol: symbol.to_string(),
            status: "TRADING".to_string(),
            base: "BTC".to_string(),
            quote: "USDT".to_string(),
            base_precision: 8,
            quote_precision: 2,
            lot_step: Some(dec!(0.00001)),
        }
    }

    fn sample_deal(cycle: &str) -> Deal {
        Deal::new(
            CycleId(cycle.to_string()),
            dec!(100),
            dec!(0.02),
            chrono::Utc::now(),
            [
                Action::new("BTCUSDT", TradeDirection::Buy, dec!(0.002)),
                Action::new("ETHBTC", TradeDirection::Buy, dec!(0.04)),
                Action::new("ETHUSDT", TradeDirection::Sell, dec!(0.04)),
            ],
        )
    }

    fn sample_executor(cap: Option<u64>) -> Executor {
        let exchange = triarb_exchange::SimulatedExchange::new(vec![
            symbol_info("BTCUSDT"),
            symbol_info("ETHBTC"),
            symbol_info("ETHUSDT"),
        ]);
        Executor::new(cap, exchange, Arc::new(NoopNotifier), Arc::new(SystemClock::new()))
    }

    #[test]
    fn happy_path_executes_all_three_legs() {
        let executor = sample_executor(None);
        let report = executor.submit(sample_deal("c1")).unwrap();
        assert_eq!(executor.count(), 1);
        assert_eq!(report.order_ids.len(), 3);
    }

    #[test]
    fn cap_of_zero_rejects_immediately() {
        let executor = sample_executor(Some(0));
        let err = executor.submit(sample_deal("c1")).unwrap_err();
        assert!(matches!(err, ExecutorError::RejectedCap(_)));
        assert_eq!(executor.count(), 0);
    }

    #[test]
    fn unknown_symbol_fails_the_deal() {
        let exchange = triarb_exchange::SimulatedExchange::new(vec![symbol_info("BTCUSDT")]);
        let executor = Executor::new(None, exchange, Arc::new(NoopNotifier), Arc::new(SystemClock::new()));
        let err = executor.submit(sample_deal("c1")).unwrap_err();
        assert!(matches!(
            err,
            ExecutorError::TradeFailed { leg: 1, .. } // ETHBTC is not in the catalogue
        ));
        // budget is reserved optimistically and not refunded on failure.
        assert_eq!(executor.count(), 1);
    }

    #[test]
    fn cap_is_never_exceeded_under_concurrency() {
        // EXECUTION_CAP=1, two deals arrive concurrently.
        let executor = Arc::new(sample_executor(Some(1)));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|i| {
                let executor = executor.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    executor.submit(sample_deal(&format!("c{i}")))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let accepted = results.iter().filter(|r| r.is_ok()).count();
        let rejected = results
            .iter()
            .filter(|r| matches!(r, Err(ExecutorError::RejectedCap(_))))
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(rejected, 1);
        assert_eq!(executor.count(), 1);
    }
}
