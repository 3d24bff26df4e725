/*!
 * Process Clock
 * Source of process start timestamps
 */

use crate::core::types::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Supplies creation timestamps to the registry
pub trait Clock: Send + Sync {
    /// Current time in microseconds since the Unix epoch
    fn now(&self) -> Timestamp;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as Timestamp)
            .unwrap_or(0)
    }
}

/// Manually driven clock for deterministic tests and benchmarks
///
/// Time only moves when `advance` or `set` is called.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Move the clock forward and return the new time
    pub fn advance(&self, micros: u64) -> Timestamp {
        self.now.fetch_add(micros, Ordering::SeqCst) + micros
    }

    pub fn set(&self, timestamp: Timestamp) {
        self.now.store(timestamp, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
