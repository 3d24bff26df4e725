/*!
 * Process Registry
 * Bounded process table with admission policy, kills and sorted listings
 */

use super::clock::Clock;
use super::registry_builder::ProcessRegistryBuilder;
use super::store::{MemoryStore, ProcessStore};
use super::types::{AddMode, Priority, Process, SortMode};
use crate::core::errors::{ProcessError, ProcessResult};
use crate::core::types::Pid;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Process registry
///
/// All operations lock the store once, so "check capacity, pick eviction
/// candidate, evict, insert" is a single atomic step for concurrent callers.
/// Share it between callers with `Arc`.
pub struct ProcessRegistry<S: ProcessStore = MemoryStore> {
    pub(super) store: Mutex<S>,
    pub(super) max_processes: NonZeroUsize,
    pub(super) clock: Arc<dyn Clock>,
}

impl ProcessRegistry<MemoryStore> {
    /// In-memory registry using the wall clock
    pub fn in_memory(max_processes: NonZeroUsize) -> Self {
        ProcessRegistryBuilder::new(MemoryStore::new(), max_processes).build()
    }
}

impl<S: ProcessStore> ProcessRegistry<S> {
    /// Create a builder for a registry over `store`
    pub fn builder(store: S, max_processes: NonZeroUsize) -> ProcessRegistryBuilder<S> {
        ProcessRegistryBuilder::new(store, max_processes)
    }

    /// Add a process, applying `mode` if the registry is full
    pub fn add_process(&self, priority: Priority, mode: AddMode) -> ProcessResult<Process> {
        let mut store = self.store.lock();

        store.atomically(|store| {
            let count = store.count()?;
            let max = self.max_processes.get();

            // A store reopened with a smaller capacity can hold more than max
            let mut evicted = Vec::new();
            if count >= max {
                let excess = count - max + 1;
                if mode == AddMode::Prio && excess > 1 {
                    self.ensure_lower_priorities(store, priority, excess)?;
                }

                for _ in 0..excess {
                    let victim = self.eviction_candidate(store, priority, mode)?;
                    let removed = store.delete_by_id(victim.pid)?.ok_or_else(|| {
                        ProcessError::Store(format!("eviction candidate {} disappeared", victim.pid))
                    })?;
                    evicted.push(removed.pid);
                }
            }

            let process = store.insert(priority, self.clock.now())?;

            if evicted.is_empty() {
                info!(pid = process.pid, priority = %priority, "Created process");
            } else {
                info!(
                    pid = process.pid,
                    priority = %priority,
                    mode = %mode,
                    evicted = ?evicted,
                    "Created process after eviction"
                );
            }

            Ok(process)
        })
    }

    /// Fail unless at least `needed` processes have a priority below `priority`
    ///
    /// Runs before any eviction so a priority add either frees enough slots
    /// or leaves the store untouched, even without a transactional store.
    fn ensure_lower_priorities(&self, store: &S, priority: Priority, needed: usize) -> ProcessResult<()> {
        let lower = Priority::ALL
            .into_iter()
            .filter(|candidate| *candidate < priority)
            .map(|candidate| store.find_pids_with_priority(candidate).map(|pids| pids.len()))
            .sum::<ProcessResult<usize>>()?;

        if lower >= needed {
            return Ok(());
        }

        let err = ProcessError::NoLowerPriorityAvailable {
            requested: priority,
            max: self.max_processes.get(),
        };
        warn!(priority = %priority, lower, needed, "Rejected new process: {}", err);
        Err(err)
    }

    /// Pick the process to evict from a full registry, or reject the add
    fn eviction_candidate(&self, store: &S, priority: Priority, mode: AddMode) -> ProcessResult<Process> {
        let max = self.max_processes.get();

        let candidate = match mode {
            AddMode::Default => None,
            AddMode::Fifo => store.find_oldest()?,
            AddMode::Prio => store
                .find_oldest_of_lowest_priority()?
                .filter(|candidate| candidate.priority < priority),
        };

        candidate.ok_or_else(|| {
            let err = match mode {
                AddMode::Prio => ProcessError::NoLowerPriorityAvailable {
                    requested: priority,
                    max,
                },
                AddMode::Default | AddMode::Fifo => ProcessError::CapacityExceeded { max },
            };
            warn!(priority = %priority, mode = %mode, max, "Rejected new process: {}", err);
            err
        })
    }

    /// Kill a single process
    ///
    /// Fails with `NotFound` when the PID is not live, including on a
    /// second kill of the same PID.
    pub fn kill_process(&self, pid: Pid) -> ProcessResult<Process> {
        let mut store = self.store.lock();
        let process = store
            .atomically(|store| store.delete_by_id(pid))?
            .ok_or(ProcessError::NotFound(pid))?;

        info!(pid, priority = %process.priority, "Killed process");
        Ok(process)
    }

    /// Kill every process with `priority`, returning how many were killed
    pub fn kill_group(&self, priority: Priority) -> ProcessResult<usize> {
        let mut store = self.store.lock();
        let (pids, killed) = store.atomically(|store| {
            let pids = store.find_pids_with_priority(priority)?;
            let killed = store.delete_all_by_id(&pids)?;
            Ok((pids, killed))
        })?;

        info!(priority = %priority, killed, pids = ?pids, "Killed process group");
        Ok(killed)
    }

    /// Kill every process, returning how many were killed
    pub fn kill_all(&self) -> ProcessResult<usize> {
        let mut store = self.store.lock();
        let killed = store.atomically(|store| store.delete_all())?;

        info!(killed, "Killed all processes");
        Ok(killed)
    }

    pub fn get_process(&self, pid: Pid) -> ProcessResult<Option<Process>> {
        let process = self.store.lock().get(pid)?;
        debug!(pid, found = process.is_some(), "Process lookup");
        Ok(process)
    }

    /// Every live process in `sort` order
    pub fn list_processes(&self, sort: SortMode) -> ProcessResult<Vec<Process>> {
        let processes = self.store.lock().find_all_ordered_by(sort)?;
        debug!(sort = %sort, count = processes.len(), "Listed processes");
        Ok(processes)
    }

    /// Number of live processes
    pub fn len(&self) -> ProcessResult<usize> {
        self.store.lock().count()
    }

    pub fn is_empty(&self) -> ProcessResult<bool> {
        Ok(self.len()? == 0)
    }

    #[inline]
    #[must_use]
    pub fn max_processes(&self) -> usize {
        self.max_processes.get()
    }

    /// Name of the backing store
    pub fn backend(&self) -> &'static str {
        self.store.lock().backend()
    }
}
