/*!
 * Process Module
 * Process registry, admission policy and storage backends
 */

pub mod clock;
pub mod registry;
pub mod registry_builder;
pub mod store;
pub mod types;

// Re-export for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use registry::ProcessRegistry;
pub use registry_builder::ProcessRegistryBuilder;
pub use store::{MemoryStore, ProcessStore, SqliteStore};
pub use types::{AddMode, Priority, Process, SortMode};
