/*!
 * SQLite Process Store
 * Persisted variant of the process store
 */

use super::ProcessStore;
use crate::core::errors::{ProcessError, ProcessResult};
use crate::core::types::{Pid, Timestamp};
use crate::process::types::{Priority, Process, SortMode};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info, warn};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS processes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        priority INTEGER NOT NULL CHECK (priority BETWEEN 1 AND 3),
        start_time INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_processes_start_time ON processes (start_time, id);
    CREATE INDEX IF NOT EXISTS idx_processes_priority ON processes (priority, start_time, id);
";

const SELECT: &str = "SELECT id, priority, start_time FROM processes";

impl From<rusqlite::Error> for ProcessError {
    fn from(err: rusqlite::Error) -> Self {
        ProcessError::store(err)
    }
}

/// SQLite-backed store
///
/// PIDs come from an `AUTOINCREMENT` key, so they keep increasing across
/// restarts and are never reused.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> ProcessResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(ProcessError::store)?;
        }

        let conn = Connection::open(path)?;
        // Another invocation may hold the write lock briefly
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        info!(path = %path.display(), "Opened SQLite process store");
        Self::with_connection(conn)
    }

    /// Private in-memory database
    pub fn open_in_memory() -> ProcessResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> ProcessResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn query_one(&self, sql: &str, params: impl rusqlite::Params) -> ProcessResult<Option<Process>> {
        let raw = self
            .conn
            .query_row(sql, params, RawProcess::from_row)
            .optional()?;
        raw.map(RawProcess::into_process).transpose()
    }

    fn query_many(&self, sql: &str) -> ProcessResult<Vec<Process>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], RawProcess::from_row)?;

        let mut processes = Vec::new();
        for row in rows {
            processes.push(row?.into_process()?);
        }
        Ok(processes)
    }
}

/// Row as stored, before priority/PID validation
struct RawProcess {
    id: i64,
    priority: i64,
    start_time: i64,
}

impl RawProcess {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            priority: row.get(1)?,
            start_time: row.get(2)?,
        })
    }

    fn into_process(self) -> ProcessResult<Process> {
        let pid = Pid::try_from(self.id)
            .map_err(|_| ProcessError::Store(format!("process id {} out of range", self.id)))?;
        let priority = u8::try_from(self.priority)
            .ok()
            .and_then(Priority::from_value)
            .ok_or_else(|| {
                ProcessError::Store(format!(
                    "process {} has invalid priority value {}",
                    self.id, self.priority
                ))
            })?;
        let start_time = Timestamp::try_from(self.start_time).map_err(|_| {
            ProcessError::Store(format!(
                "process {} has invalid start time {}",
                self.id, self.start_time
            ))
        })?;

        Ok(Process::new(pid, priority, start_time))
    }
}

fn order_clause(sort: SortMode) -> &'static str {
    match sort {
        SortMode::StartTime => "ORDER BY start_time, id",
        SortMode::Pid => "ORDER BY id",
        SortMode::Priority => "ORDER BY priority, id",
    }
}

impl ProcessStore for SqliteStore {
    fn count(&self) -> ProcessResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM processes", [], |row| row.get(0))?;
        usize::try_from(count).map_err(ProcessError::store)
    }

    fn get(&self, pid: Pid) -> ProcessResult<Option<Process>> {
        self.query_one(&format!("{SELECT} WHERE id = ?1"), params![pid])
    }

    fn find_oldest(&self) -> ProcessResult<Option<Process>> {
        self.query_one(&format!("{SELECT} ORDER BY start_time, id LIMIT 1"), [])
    }

    fn find_lowest_priority(&self) -> ProcessResult<Option<Priority>> {
        let lowest: Option<i64> =
            self.conn
                .query_row("SELECT MIN(priority) FROM processes", [], |row| row.get(0))?;

        lowest
            .map(|value| {
                u8::try_from(value)
                    .ok()
                    .and_then(Priority::from_value)
                    .ok_or_else(|| ProcessError::Store(format!("invalid priority value {}", value)))
            })
            .transpose()
    }

    fn find_oldest_with_priority(&self, priority: Priority) -> ProcessResult<Option<Process>> {
        self.query_one(
            &format!("{SELECT} WHERE priority = ?1 ORDER BY start_time, id LIMIT 1"),
            params![priority.value()],
        )
    }

    fn find_oldest_of_lowest_priority(&self) -> ProcessResult<Option<Process>> {
        self.query_one(&format!("{SELECT} ORDER BY priority, start_time, id LIMIT 1"), [])
    }

    fn find_pids_with_priority(&self, priority: Priority) -> ProcessResult<Vec<Pid>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM processes WHERE priority = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![priority.value()], |row| row.get::<_, i64>(0))?;

        let mut pids = Vec::new();
        for id in rows {
            let id = id?;
            pids.push(
                Pid::try_from(id)
                    .map_err(|_| ProcessError::Store(format!("process id {} out of range", id)))?,
            );
        }
        Ok(pids)
    }

    fn find_all_ordered_by(&self, sort: SortMode) -> ProcessResult<Vec<Process>> {
        self.query_many(&format!("{SELECT} {}", order_clause(sort)))
    }

    fn insert(&mut self, priority: Priority, start_time: Timestamp) -> ProcessResult<Process> {
        let stored_time = i64::try_from(start_time).map_err(ProcessError::store)?;
        self.conn.execute(
            "INSERT INTO processes (priority, start_time) VALUES (?1, ?2)",
            params![priority.value(), stored_time],
        )?;

        let id = self.conn.last_insert_rowid();
        let pid = Pid::try_from(id)
            .map_err(|_| ProcessError::Store(format!("process id {} out of range", id)))?;
        Ok(Process::new(pid, priority, start_time))
    }

    fn delete_by_id(&mut self, pid: Pid) -> ProcessResult<Option<Process>> {
        let Some(process) = self.get(pid)? else {
            return Ok(None);
        };
        self.conn
            .execute("DELETE FROM processes WHERE id = ?1", params![pid])?;
        Ok(Some(process))
    }

    fn delete_all_by_id(&mut self, pids: &[Pid]) -> ProcessResult<usize> {
        let mut stmt = self.conn.prepare("DELETE FROM processes WHERE id = ?1")?;
        let mut removed = 0;
        for pid in pids {
            removed += stmt.execute(params![pid])?;
        }
        Ok(removed)
    }

    fn delete_all(&mut self) -> ProcessResult<usize> {
        Ok(self.conn.execute("DELETE FROM processes", [])?)
    }

    fn atomically<T, F>(&mut self, f: F) -> ProcessResult<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> ProcessResult<T>,
    {
        // IMMEDIATE takes the write lock up front so the capacity check and
        // the eviction see the same rows even across processes
        self.conn.execute_batch("BEGIN IMMEDIATE")?;

        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT")?;
                debug!("SQLite transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    warn!(error = %rollback, "SQLite rollback failed");
                }
                Err(err)
            }
        }
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
