use thiserror::Error;

use triarb_core::CycleId;
use triarb_exchange::ExchangeError;

/// Errors raised by `Executor` while attempting to place and fill a deal's
/// three legs.
///
/// An in-flight leg is never unwound when a later leg fails, so
/// `TradeFailed` records exactly which leg broke and why, for the caller to
/// log and move on.
#[derive(Error, Debug, Clone)]
pub enum ExecutorError {
    #[error("execution cap reached, deal for cycle {0} rejected")]
    RejectedCap(CycleId),

    #[error("deal for cycle {cycle} failed on leg {leg}: {cause}")]
    TradeFailed {
        cycle: CycleId,
        leg: usize,
        #[source]
        cause: ExchangeError,
    },
}

/// Non-transient errors surfaced on the shared error channel every worker
/// reports to: the supervisor in `main` turns these into a `warn` log
/// (non-trade) or a fatal shutdown (trade inconsistency, configuration).
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error("matrix error: {0}")]
    Matrix(#[from] triarb_matrix::MatrixError),
}

impl EngineError {
    /// Trade inconsistency and configuration errors are fatal;
    /// everything else is a warning.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Executor(ExecutorError::TradeFailed { .. }))
    }
}

/// Fatal startup errors: a broken catalogue or a
/// base asset that matches zero cycles. Never recovered in-worker, the
/// process exits before a single worker thread is spawned.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("failed to fetch exchange catalogue: {0}")]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    Topology(#[from] triarb_topology::TopologyError),
}
