//! Triarb Engine
//!
//! Worker pools, executor and process wiring for the triangular arbitrage
//! engine: everything that isn't pure domain logic (`triarb-core`), pure
//! computation (`triarb-optimizer`), or shared state (`triarb-matrix`).
//! `bootstrap::Engine` ties the pools and a concrete
//! `ExchangeClient` together into a single running pipeline; `main.rs` is
//! the thin CLI shell around it.

mod bootstrap;
mod compute_loop;
mod depth_ingest;
mod depth_queue;
mod error;
mod executor;

pub use bootstrap::{pairs_from_catalogue, Engine};
pub use compute_loop::{ComputeLoop, GateConfig};
pub use depth_ingest::DepthIngest;
pub use depth_queue::{DepthMessage, DepthQueue};
pub use error::{EngineError, ExecutorError, StartupError};
pub use executor::{Executor, ExecutionReport};
