use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use triarb_clock::Clock;
use triarb_core::CycleId;
use triarb_matrix::Matrix;
use triarb_optimizer::{optimize, OptimizerConfig};

use crate::error::EngineError;
use crate::executor::Executor;

/// Gate thresholds a `ComputeLoop` worker checks before accepting a deal.
#[derive(Debug, Clone, Copy)]
pub struct GateConfig {
    pub age_threshold_ms: u64,
    pub profit_threshold: rust_decimal::Decimal,
    pub trading_enabled: bool,
}

/// Pool of workers pulling `Cycle`s from the shared round-robin queue,
/// invoking `Optimizer`, gating on age/profit, and dispatching accepted
/// deals to `Executor`.
///
/// The queue is an `crossbeam_channel` used as a ring: a worker `recv()`s a
/// cycle id and `send()`s it back to the tail after evaluation, whether or
/// not a deal was accepted. This is what gives every cycle a fair share of
/// compute regardless of how often it crosses the threshold.
pub struct ComputeLoop {
    handles: Vec<JoinHandle<()>>,
}

impl ComputeLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        worker_count: usize,
        queue_tx: Sender<CycleId>,
        queue_rx: Receiver<CycleId>,
        matrix: Arc<Matrix>,
        optimizer_config: OptimizerConfig,
        gate: GateConfig,
        executor: Arc<Executor>,
        clock: Arc<dyn Clock>,
        errors: Sender<EngineError>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        let handles = (0..worker_count)
            .map(|id| {
                let queue_tx = queue_tx.clone();
                let queue_rx = queue_rx.clone();
                let matrix = matrix.clone();
                let executor = executor.clone();
                let clock = clock.clone();
                let errors = errors.clone();
                let stop = stop.clone();
                thread::Builder::new()
                    .name(format!("compute-{id}"))
                    .spawn(move || {
                        Self::run(
                            queue_tx,
                            queue_rx,
                            matrix,
                            optimizer_config,
                            gate,
                            executor,
                            clock,
                            errors,
                            stop,
                        )
                    })
                    .expect("failed to spawn compute worker")
            })
            .collect();
        Self { handles }
    }

    #[allow(clippy::too_many_arguments)]
    fn run(
        queue_tx: Sender<CycleId>,
        queue_rx: Receiver<CycleId>,
        matrix: Arc<Matrix>,
        optimizer_config: OptimizerConfig,
        gate: GateConfig,
        executor: Arc<Executor>,
        clock: Arc<dyn Clock>,
        errors: Sender<EngineError>,
        stop: Arc<AtomicBool>,
    ) {
        // Compute workers stop immediately and discard the cycle queue on
        // shutdown - no drain-on-shutdown here, unlike DepthIngest.
        while !stop.load(Ordering::Relaxed) {
            let cycle_id = match queue_rx.recv_timeout(Duration::from_millis(100)) {
                Ok(id) => id,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            Self::evaluate_one(
                &cycle_id,
                &matrix,
                &optimizer_config,
                &gate,
                &executor,
                clock.as_ref(),
                &errors,
            );

            if stop.load(Ordering::Relaxed) {
                break;
            }
            // requeue at the tail regardless of outcome.
            let _ = queue_tx.send(cycle_id);
        }
    }

    fn evaluate_one(
        cycle_id: &CycleId,
        matrix: &Matrix,
        optimizer_config: &OptimizerConfig,
        gate: &GateConfig,
        executor: &Executor,
        clock: &dyn Clock,
        errors: &Sender<EngineError>,
    ) {
        let (cycle, books, snapshot_ts) = match matrix.snapshot(cycle_id) {
            Ok(triple) => triple,
            Err(err) => {
                let _ = errors.send(EngineError::Matrix(err));
                return;
            }
        };

        let now = clock.now();
        let age = now.signed_duration_since(snapshot_ts).num_milliseconds().max(0) as u64;
        matrix.record_age(age as f64);

        let Some(deal) = optimize(&cycle, &books, optimizer_config, snapshot_ts) else {
            // book-starvation: no-deal, requeue, no log.
            return;
        };

        if age > gate.age_threshold_ms || deal.expected_profit < gate.profit_threshold {
            // gate-miss: requeue, no log.
            return;
        }

        log::debug!(
            "{} (age: {age}ms): {:.4}%",
            cycle.text(),
            deal.expected_profit * rust_decimal::Decimal::ONE_HUNDRED
        );

        if !gate.trading_enabled {
            return;
        }

        match executor.submit(deal) {
            Ok(_) | Err(crate::error::ExecutorError::RejectedCap(_)) => {}
            Err(err) => {
                let _ = errors.send(EngineError::Executor(err));
            }
        }
    }

    pub fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use rust_decimal_macros::dec;
    use triarb_clock::SteppableClock;
    use triarb_core::{Asset, BookLevel, Cycle, OrderBook, TradingPair};
    use triarb_exchange::SymbolInfo;
    use triarb_notify::NoopNotifier;
    use triarb_optimizer::Grid;

    fn pair(symbol: &str, base: &str, quote: &str) -> TradingPair {
        TradingPair::new(symbol, base, quote, 8, 2, dec!(0.00001))
    }

    fn sample_cycle() -> Cycle {
        let start = pair("BTCUSDT", "BTC", "USDT");
        let middle = pair("ETHBTC", "ETH", "BTC");
        let end = pair("ETHUSDT", "ETH", "USDT");
        Cycle::new(Asset::from("USDT"), start, middle, end).unwrap()
    }

    fn setup() -> (Arc<Matrix>, Arc<SteppableClock>, Cycle) {
        let clock = Arc::new(SteppableClock::new(chrono::Utc::now()));
        let matrix = Arc::new(Matrix::new(clock.clone()));
        let cycle = sample_cycle();
        for symbol in cycle.symbols() {
            matrix.create_pair(symbol, dec!(0.00001));
        }
        matrix.create_cycle(cycle.clone()).unwrap();
        // advance past the placeholder books' creation timestamp so the
        // first real update in each test is not dropped as a tie.
        clock.advance(chrono::Duration::milliseconds(1));
        (matrix, clock, cycle)
    }

    fn book(asks: Vec<(i64, &str)>, bids: Vec<(i64, &str)>, ts: triarb_core::Timestamp) -> OrderBook {
        let mk = |p: i64, q: &str| BookLevel::new(rust_decimal::Decimal::from(p), q.parse().unwrap());
        OrderBook::from_levels(
            asks.into_iter().map(|(p, q)| mk(p, q)).collect(),
            bids.into_iter().map(|(p, q)| mk(p, q)).collect(),
            20,
            ts,
        )
    }

    fn sample_executor() -> Arc<Executor> {
        let exchange = triarb_exchange::SimulatedExchange::new(vec![
            SymbolInfo {
                symbol: "BTCUSDT".to_string(),
                status: "TRADING".to_string(),
                base: "BTC".to_string(),
                quote: "USDT".to_string(),
                base_precision: 8,
                quote_precision: 2,
                lot_step: Some(dec!(0.00001)),
            },
            SymbolInfo {
                symbol: "ETHBTC".to_string(),
                status: "TRADING".to_string(),
                base: "ETH".to_string(),
                quote: "BTC".to_string(),
                base_precision: 8,
                quote_precision: 2,
                lot_step: Some(dec!(0.00001)),
            },
            SymbolInfo {
                symbol: "ETHUSDT".to_string(),
                status: "TRADING".to_string(),
                base: "ETH".to_string(),
                quote: "USDT".to_string(),
                base_precision: 8,
                quote_precision: 2,
                lot_step: Some(dec!(0.00001)),
            },
        ]);
        Arc::new(Executor::new(
            None,
            exchange,
            Arc::new(NoopNotifier),
            Arc::new(triarb_clock::SystemClock::new()),
        ))
    }

    #[test]
    fn stale_snapshot_is_gated_and_stats_recorded() {
        let (matrix, clock, cycle) = setup();
        let t0 = clock.now();
        for symbol in cycle.symbols() {
            matrix
                .update_pair(symbol, book(vec![(1, "1000")], vec![(1, "1000")], t0))
                .unwrap();
        }
        clock.advance(chrono::Duration::milliseconds(120));

        let (errors_tx, errors_rx) = unbounded();
        let executor = sample_executor();
        let gate = GateConfig {
            age_threshold_ms: 50,
            profit_threshold: dec!(0.003),
            trading_enabled: true,
        };
        let optimizer_config = OptimizerConfig {
            taker_fee: rust_decimal::Decimal::ZERO,
            grid: Grid::new(dec!(100), dec!(100), dec!(100)),
        };

        ComputeLoop::evaluate_one(
            &cycle.id,
            &matrix,
            &optimizer_config,
            &gate,
            &executor,
            clock.as_ref(),
            &errors_tx,
        );

        assert_eq!(executor.count(), 0);
        assert!(errors_rx.try_recv().is_err());
        let summary = matrix.age_summary();
        assert_eq!(summary.mean, 120.0);
    }

    #[test]
    fn profit_below_threshold_is_gated() {
        let (matrix, clock, cycle) = setup();
        let t0 = clock.now();
        // flat books: zero profit at zero fee.
        for symbol in cycle.symbols() {
            matrix
                .update_pair(symbol, book(vec![(1, "1000000")], vec![(1, "1000000")], t0))
                .unwrap();
        }

        let (errors_tx, _errors_rx) = unbounded();
        let executor = sample_executor();
        let gate = GateConfig {
            age_threshold_ms: 10_000,
            profit_threshold: dec!(0.003),
            trading_enabled: true,
        };
        let optimizer_config = OptimizerConfig {
            taker_fee: rust_decimal::Decimal::ZERO,
            grid: Grid::new(dec!(100), dec!(100), dec!(100)),
        };

        ComputeLoop::evaluate_one(
            &cycle.id,
            &matrix,
            &optimizer_config,
            &gate,
            &executor,
            clock.as_ref(),
            &errors_tx,
        );

        assert_eq!(executor.count(), 0);
    }

    #[test]
    fn profitable_fresh_cycle_is_accepted_and_executed() {
        let (matrix, clock, cycle) = setup();
        let t0 = clock.now();
        matrix
            .update_pair("BTCUSDT", book(vec![(50_000, "1")], vec![], t0))
            .unwrap();
        matrix
            .update_pair(
                "ETHBTC",
                OrderBook::from_levels(vec![BookLevel::new(dec!(0.05), dec!(1))], vec![], 20, t0),
                )
            .unwrap();
        matrix
            .update_pair("ETHUSDT", book(vec![], vec![(2_550, "1")], t0))
            .unwrap();

        let (errors_tx, _errors_rx) = unbounded();
        let executor = sample_executor();
        let gate = GateConfig {
            age_threshold_ms: 10_000,
            profit_threshold: dec!(0.003),
            trading_enabled: true,
        };
        let optimizer_config = OptimizerConfig {
            taker_fee: rust_decimal::Decimal::ZERO,
            grid: Grid::new(dec!(100), dec!(100), dec!(100)),
        };

        ComputeLoop::evaluate_one(
            &cycle.id,
            &matrix,
            &optimizer_config,
            &gate,
            &executor,
            clock.as_ref(),
            &errors_tx,
        );

        assert_eq!(executor.count(), 1);
    }
}
