use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver};

use triarb_clock::{Clock, SystemClock};
use triarb_config::EngineConfig;
use triarb_core::TradingPair;
use triarb_exchange::{ExchangeClient, RawDepth, SymbolInfo};
use triarb_matrix::Matrix;
use triarb_notify::{LogNotifier, NoopNotifier, Notifier};
use triarb_optimizer::OptimizerConfig;
use triarb_topology::TopologyError;

use crate::compute_loop::{ComputeLoop, GateConfig};
use crate::depth_ingest::DepthIngest;
use crate::depth_queue::{DepthMessage, DepthQueue};
use crate::error::{EngineError, StartupError};
use crate::executor::Executor;

/// How long a worker (and the supervisor loop) blocks per iteration before
/// re-checking the stop flag.
const QUEUE_POLL: Duration = Duration::from_millis(100);

/// Convert the exchange's raw symbol catalogue into the engine's
/// `TradingPair`s: drop symbols not currently `TRADING`, fail fatally
/// if a remaining symbol has no `LOT_SIZE` filter.
pub fn pairs_from_catalogue(symbols: &[SymbolInfo]) -> Result<Vec<TradingPair>, TopologyError> {
    symbols
        .iter()
        .filter(|s| s.is_trading())
        .map(|s| {
            let step = s
                .lot_step
                .ok_or_else(|| TopologyError::MissingLotSize(s.symbol.clone()))?;
            Ok(TradingPair::new(
                s.symbol.clone(),
                s.base.clone(),
                s.quote.clone(),
                s.base_precision,
                s.quote_precision,
                step,
            ))
        })
        .collect()
}

/// A fully wired, running instance of the pipeline: `Topology` has already
/// run once, every worker pool is spawned, and the shared error channel is
/// being drained by [`Engine::supervise`].
pub struct Engine {
    matrix: Arc<Matrix>,
    executor: Arc<Executor>,
    stop: Arc<AtomicBool>,
    depth_ingest: DepthIngest,
    compute_loop: ComputeLoop,
    errors_rx: Receiver<EngineError>,
}

impl Engine {
    /// Build the matrix and topology from `exchange`'s catalogue, subscribe
    /// every symbol the topology needs, and spawn the `DepthIngest` and
    /// `ComputeLoop` worker pools. Returns once everything is running.
    pub fn start(config: &EngineConfig, exchange: Arc<dyn ExchangeClient>) -> Result<Self, StartupError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());

        let catalogue = exchange.exchange_info()?;
        let pairs = pairs_from_catalogue(&catalogue)?;
        let topology = triarb_topology::try_build(&pairs, &config.base_asset)?;

        let matrix = Arc::new(Matrix::new(clock.clone()));
        let pairs_by_symbol: std::collections::HashMap<&str, &TradingPair> =
            pairs.iter().map(|p| (p.symbol.as_str(), p)).collect();

        for symbol in &topology.subscriptions {
            if let Some(pair) = pairs_by_symbol.get(symbol.as_str()) {
                matrix.create_pair(symbol, pair.step);
            }
        }

        let (cycle_tx, cycle_rx) = unbounded();
        for cycle in topology.cycles {
            let id = cycle.id.clone();
            matrix
                .create_cycle(cycle)
                .expect("topology only emits cycles over symbols it just registered");
            cycle_tx.send(id).expect("cycle queue receiver outlives this loop");
        }

        let depth_queue = Arc::new(DepthQueue::new(topology.subscriptions.len().max(1) * 4));
        for symbol in &topology.subscriptions {
            let queue = depth_queue.clone();
            let clock = clock.clone();
            let symbol_owned = symbol.clone();
            exchange
                .subscribe_depth(
                    symbol,
                    config.depth_size,
                    Box::new(move |raw: RawDepth| {
                        queue.push(DepthMessage {
                            symbol: symbol_owned.clone(),
                            ts: clock.now(),
                            raw,
                        });
                    }),
                )
                .map_err(StartupError::Exchange)?;
        }

        let notifier: Arc<dyn Notifier> = match &config.telegram {
            // A real Telegram integration is an external collaborator;
            // LogNotifier is the visible stand-in until that adapter
            // exists.
            Some(_) => Arc::new(LogNotifier),
            None => Arc::new(NoopNotifier),
        };

        let stop = Arc::new(AtomicBool::new(false));
        let (errors_tx, errors_rx) = unbounded();

        let executor = Arc::new(Executor::new(config.execution_cap, exchange, notifier, clock.clone()));

        let depth_ingest = DepthIngest::spawn(
            config.depth_workers,
            config.depth_size,
            depth_queue,
            matrix.clone(),
            stop.clone(),
        );

        let optimizer_config = OptimizerConfig {
            taker_fee: config.taker_fee,
            grid: config.investment_grid,
        };
        let gate = GateConfig {
            age_threshold_ms: config.age_threshold_ms,
            profit_threshold: config.profit_threshold,
            trading_enabled: config.trading_enabled,
        };
        let compute_loop = ComputeLoop::spawn(
            config.compute_workers,
            cycle_tx,
            cycle_rx,
            matrix.clone(),
            optimizer_config,
            gate,
            executor.clone(),
            clock,
            errors_tx,
            stop.clone(),
        );

        log::info!(
            "engine started: {} cycles, {} subscriptions, {} depth workers, {} compute workers",
            matrix.registered_cycle_ids().len(),
            matrix.registered_symbols().len(),
            config.depth_workers,
            config.compute_workers
        );

        Ok(Self {
            matrix,
            executor,
            stop,
            depth_ingest,
            compute_loop,
            errors_rx,
        })
    }

    /// Shared stop flag every worker observes at the top of its loop.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Drain the shared error channel until `stop` is set, turning each
    /// `EngineError` into a `warn` log (non-trade) or a fatal shutdown
    /// (trade inconsistency).
    ///
    /// A fatal error sets `stop` itself rather than merely logging, so the
    /// caller's `SIGINT` handler is not the only path to shutdown.
    pub fn supervise(&self) {
        while !self.stop.load(Ordering::Relaxed) {
            match self.errors_rx.recv_timeout(QUEUE_POLL) {
                Ok(err) if err.is_fatal() => {
                    log::error!("fatal engine error, shutting down: {err}");
                    self.stop.store(true, Ordering::Relaxed);
                }
                Ok(err) => log::warn!("engine error: {err}"),
                Err(_) => continue,
            }
        }
    }

    pub fn ages(&self) -> triarb_matrix::StatsSummary {
        self.matrix.age_summary()
    }

    pub fn executed_deals(&self) -> u64 {
        self.executor.count()
    }

    /// Stop and join every worker pool. `ComputeLoop` workers stop
    /// immediately (their cycle queue is discarded); `DepthIngest` workers
    /// drain whatever is left in the depth queue first. Any deal already
    /// in flight inside `Executor` runs to completion or failure; there is
    /// no mid-deal abort.
    pub fn shutdown(self) {
        self.stop.store(true, Ordering::Relaxed);
        self.compute_loop.join();
        self.depth_ingest.join();
    }
}
