/*!
 * In-Memory Process Store
 * Hash map keyed by PID with ordered secondary indexes for eviction queries
 */

use super::ProcessStore;
use crate::core::errors::{ProcessError, ProcessResult};
use crate::core::limits::FIRST_PID;
use crate::core::types::{Pid, Timestamp};
use crate::process::types::{Priority, Process, SortMode};
use std::collections::{BTreeSet, HashMap};

/// In-memory store
///
/// # Performance
/// - O(1) lookup by PID
/// - O(log n) oldest / oldest-of-lowest-priority queries via ordered indexes
#[derive(Debug)]
pub struct MemoryStore {
    processes: HashMap<Pid, Process>,
    // (start_time, pid)
    by_age: BTreeSet<(Timestamp, Pid)>,
    // (priority, start_time, pid)
    by_priority: BTreeSet<(Priority, Timestamp, Pid)>,
    next_pid: Pid,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            processes: HashMap::new(),
            by_age: BTreeSet::new(),
            by_priority: BTreeSet::new(),
            next_pid: FIRST_PID,
        }
    }

    fn index(&mut self, process: &Process) {
        self.by_age.insert(process.age_key());
        self.by_priority.insert(process.eviction_key());
    }

    fn unindex(&mut self, process: &Process) {
        self.by_age.remove(&process.age_key());
        self.by_priority.remove(&process.eviction_key());
    }

    fn remove(&mut self, pid: Pid) -> Option<Process> {
        let process = self.processes.remove(&pid)?;
        self.unindex(&process);
        Some(process)
    }

    fn lookup(&self, key: Option<Pid>) -> Option<Process> {
        key.and_then(|pid| self.processes.get(&pid).copied())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessStore for MemoryStore {
    fn count(&self) -> ProcessResult<usize> {
        Ok(self.processes.len())
    }

    fn get(&self, pid: Pid) -> ProcessResult<Option<Process>> {
        Ok(self.processes.get(&pid).copied())
    }

    fn find_oldest(&self) -> ProcessResult<Option<Process>> {
        Ok(self.lookup(self.by_age.first().map(|&(_, pid)| pid)))
    }

    fn find_lowest_priority(&self) -> ProcessResult<Option<Priority>> {
        Ok(self.by_priority.first().map(|&(priority, _, _)| priority))
    }

    fn find_oldest_with_priority(&self, priority: Priority) -> ProcessResult<Option<Process>> {
        let first = self
            .by_priority
            .range((priority, Timestamp::MIN, Pid::MIN)..=(priority, Timestamp::MAX, Pid::MAX))
            .next()
            .map(|&(_, _, pid)| pid);
        Ok(self.lookup(first))
    }

    fn find_oldest_of_lowest_priority(&self) -> ProcessResult<Option<Process>> {
        Ok(self.lookup(self.by_priority.first().map(|&(_, _, pid)| pid)))
    }

    fn find_pids_with_priority(&self, priority: Priority) -> ProcessResult<Vec<Pid>> {
        let mut pids: Vec<Pid> = self
            .processes
            .values()
            .filter(|p| p.priority == priority)
            .map(|p| p.pid)
            .collect();
        pids.sort_unstable();
        Ok(pids)
    }

    fn find_all_ordered_by(&self, sort: SortMode) -> ProcessResult<Vec<Process>> {
        let mut all: Vec<Process> = self.processes.values().copied().collect();
        all.sort_by(|a, b| sort.compare(a, b));
        Ok(all)
    }

    fn insert(&mut self, priority: Priority, start_time: Timestamp) -> ProcessResult<Process> {
        let pid = self.next_pid;
        self.next_pid = pid
            .checked_add(1)
            .ok_or_else(|| ProcessError::Store("process id space exhausted".to_string()))?;

        let process = Process::new(pid, priority, start_time);
        self.index(&process);
        self.processes.insert(pid, process);
        Ok(process)
    }

    fn delete_by_id(&mut self, pid: Pid) -> ProcessResult<Option<Process>> {
        Ok(self.remove(pid))
    }

    fn delete_all_by_id(&mut self, pids: &[Pid]) -> ProcessResult<usize> {
        Ok(pids.iter().filter(|&&pid| self.remove(pid).is_some()).count())
    }

    fn delete_all(&mut self) -> ProcessResult<usize> {
        let removed = self.processes.len();
        self.processes.clear();
        self.by_age.clear();
        self.by_priority.clear();
        Ok(removed)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
