/*!
 * Process Types
 * Priorities, admission and sort modes, and the process record
 */

use crate::core::errors::ProcessError;
use crate::core::types::{Pid, Timestamp};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use time::macros::format_description;
use time::OffsetDateTime;

/// Process priority
///
/// Variants are declared in ascending order so the derived `Ord` agrees with
/// the numeric priority value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Numeric priority value used for comparisons and storage
    #[inline]
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Map a stored numeric value back to a priority
    #[must_use]
    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Priority::Low),
            2 => Some(Priority::Medium),
            3 => Some(Priority::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Priority {
    type Err = ProcessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Priority::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ProcessError::InvalidPriority(name.to_string()))
    }
}

/// Admission policy applied when the registry is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AddMode {
    /// Reject the new process
    #[default]
    #[serde(rename = "dflt")]
    Default,
    /// Evict the oldest process
    #[serde(rename = "fifo")]
    Fifo,
    /// Evict the oldest process of the lowest priority, if that priority is
    /// strictly lower than the new one
    #[serde(rename = "prio")]
    Prio,
}

impl AddMode {
    pub const ALL: [AddMode; 3] = [AddMode::Default, AddMode::Fifo, AddMode::Prio];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            AddMode::Default => "dflt",
            AddMode::Fifo => "fifo",
            AddMode::Prio => "prio",
        }
    }
}

impl fmt::Display for AddMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for AddMode {
    type Err = ProcessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        AddMode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ProcessError::InvalidMode(name.to_string()))
    }
}

/// Ordering of a process listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortMode {
    /// Oldest first
    #[default]
    #[serde(rename = "start_time")]
    StartTime,
    /// Ascending PID
    #[serde(rename = "pid")]
    Pid,
    /// Lowest priority first
    #[serde(rename = "prio")]
    Priority,
}

impl SortMode {
    pub const ALL: [SortMode; 3] = [SortMode::StartTime, SortMode::Pid, SortMode::Priority];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SortMode::StartTime => "start_time",
            SortMode::Pid => "pid",
            SortMode::Priority => "prio",
        }
    }

    /// Total order for this mode; ties always fall back to the PID
    #[must_use]
    pub fn compare(self, a: &Process, b: &Process) -> Ordering {
        match self {
            SortMode::StartTime => a.age_key().cmp(&b.age_key()),
            SortMode::Pid => a.pid.cmp(&b.pid),
            SortMode::Priority => (a.priority, a.pid).cmp(&(b.priority, b.pid)),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for SortMode {
    type Err = ProcessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        SortMode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ProcessError::InvalidSortMode(name.to_string()))
    }
}

/// Process record
///
/// Immutable once created; only the registry's stores construct new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Process {
    pub pid: Pid,
    pub priority: Priority,
    pub start_time: Timestamp,
}

impl Process {
    #[inline]
    #[must_use]
    pub const fn new(pid: Pid, priority: Priority, start_time: Timestamp) -> Self {
        Self {
            pid,
            priority,
            start_time,
        }
    }

    /// FIFO eviction key: oldest first, lowest PID on equal timestamps
    #[inline(always)]
    #[must_use]
    pub const fn age_key(&self) -> (Timestamp, Pid) {
        (self.start_time, self.pid)
    }

    /// Priority eviction key: lowest priority, then oldest, then lowest PID
    #[inline(always)]
    #[must_use]
    pub const fn eviction_key(&self) -> (Priority, Timestamp, Pid) {
        (self.priority, self.start_time, self.pid)
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Process {:>5} - prio {:>6} - started at {}",
            self.pid,
            self.priority,
            format_timestamp(self.start_time)
        )
    }
}

/// Render a microsecond timestamp as `YYYY-MM-DD HH:MM:SS.mmm` (UTC)
pub fn format_timestamp(micros: Timestamp) -> String {
    let format =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]");

    OffsetDateTime::from_unix_timestamp_nanos(i128::from(micros) * 1_000)
        .ok()
        .and_then(|dt| dt.format(format).ok())
        .unwrap_or_else(|| format!("{}us", micros))
}
