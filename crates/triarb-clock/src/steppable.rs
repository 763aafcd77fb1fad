use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::Clock;
use triarb_core::Timestamp;

/// A clock whose value is set and advanced explicitly, for deterministic
/// tests of staleness gating and age statistics.
pub struct SteppableClock {
    now: Mutex<DateTime<Utc>>,
}

impl SteppableClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, t: DateTime<Utc>) {
        *self.now.lock() = t;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock();
        *guard += by;
    }
}

impl Clock for SteppableClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }

    fn name(&self) -> &str {
        "SteppableClock"
    }
}
