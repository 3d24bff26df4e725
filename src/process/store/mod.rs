/*!
 * Process Stores
 * Storage capability the registry's admission policy is written against
 */

use super::types::{Priority, Process, SortMode};
use crate::core::errors::ProcessResult;
use crate::core::types::{Pid, Timestamp};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Backing storage for the process registry
///
/// Implementations only store and query; every policy decision lives in
/// `ProcessRegistry`. The registry serializes all calls, so `&mut self`
/// methods never race with each other.
pub trait ProcessStore: Send {
    /// Number of live processes
    fn count(&self) -> ProcessResult<usize>;

    fn get(&self, pid: Pid) -> ProcessResult<Option<Process>>;

    /// Process with the smallest `(start_time, pid)`
    fn find_oldest(&self) -> ProcessResult<Option<Process>>;

    /// Lowest priority currently present
    fn find_lowest_priority(&self) -> ProcessResult<Option<Priority>>;

    /// Process with the smallest `(start_time, pid)` among those with `priority`
    fn find_oldest_with_priority(&self, priority: Priority) -> ProcessResult<Option<Process>>;

    /// Oldest process holding the lowest priority present
    fn find_oldest_of_lowest_priority(&self) -> ProcessResult<Option<Process>> {
        match self.find_lowest_priority()? {
            Some(priority) => self.find_oldest_with_priority(priority),
            None => Ok(None),
        }
    }

    /// PIDs of every process with `priority`, ascending
    fn find_pids_with_priority(&self, priority: Priority) -> ProcessResult<Vec<Pid>>;

    /// Every process in the order given by `sort`
    fn find_all_ordered_by(&self, sort: SortMode) -> ProcessResult<Vec<Process>>;

    /// Create a process, drawing a fresh PID from the store
    fn insert(&mut self, priority: Priority, start_time: Timestamp) -> ProcessResult<Process>;

    fn delete_by_id(&mut self, pid: Pid) -> ProcessResult<Option<Process>>;

    /// Delete the given PIDs, returning how many were present
    fn delete_all_by_id(&mut self, pids: &[Pid]) -> ProcessResult<usize>;

    /// Delete everything, returning how many processes were removed
    fn delete_all(&mut self) -> ProcessResult<usize>;

    /// Run `f` as one unit: either all of its writes land or none do
    ///
    /// The default runs `f` directly, which is enough for stores whose
    /// writes cannot fail halfway.
    fn atomically<T, F>(&mut self, f: F) -> ProcessResult<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> ProcessResult<T>,
    {
        f(self)
    }

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}
