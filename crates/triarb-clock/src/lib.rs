//! Triarb Clock
//!
//! Time-source abstraction used everywhere a `Timestamp` is produced:
//! `SystemClock` for production, `SteppableClock` for deterministic tests
//! (staleness gating, age statistics) that would otherwise be racy against
//! wall-clock time.

mod steppable;
mod system;

pub use steppable::SteppableClock;
pub use system::SystemClock;

use triarb_core::Timestamp;

/// Port for time abstraction.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    fn name(&self) -> &str {
        "Clock"
    }
}
