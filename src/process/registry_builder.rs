/*!
 * Process Registry Builder
 * Builder pattern for ProcessRegistry construction
 */

use super::clock::{Clock, SystemClock};
use super::registry::ProcessRegistry;
use super::store::ProcessStore;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::info;

/// Builder for ProcessRegistry
pub struct ProcessRegistryBuilder<S: ProcessStore> {
    store: S,
    max_processes: NonZeroUsize,
    clock: Option<Arc<dyn Clock>>,
}

impl<S: ProcessStore> ProcessRegistryBuilder<S> {
    /// Create a new builder over `store` with the given capacity
    pub fn new(store: S, max_processes: NonZeroUsize) -> Self {
        Self {
            store,
            max_processes,
            clock: None,
        }
    }

    /// Use a custom clock for start timestamps (defaults to the wall clock)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the ProcessRegistry
    pub fn build(self) -> ProcessRegistry<S> {
        let custom_clock = self.clock.is_some();
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);

        info!(
            backend = self.store.backend(),
            max_processes = self.max_processes.get(),
            custom_clock,
            "Process registry initialized"
        );

        ProcessRegistry {
            store: Mutex::new(self.store),
            max_processes: self.max_processes,
            clock,
        }
    }
}
