/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::types::Pid;
use crate::process::types::Priority;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process operation result
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Registry and command errors with serialization support
///
/// Every variant is recoverable: the registry is left untouched when one is returned.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProcessError {
    #[error("Unrecognized priority name '{0}' (expected low, medium or high)")]
    #[diagnostic(code(process::invalid_priority))]
    InvalidPriority(String),

    #[error("Unrecognized add mode '{0}' (expected dflt, fifo or prio)")]
    #[diagnostic(code(process::invalid_mode))]
    InvalidMode(String),

    #[error("Unrecognized sort mode '{0}' (expected start_time, pid or prio)")]
    #[diagnostic(code(process::invalid_sort_mode))]
    InvalidSortMode(String),

    #[error("Could not add a new process: the configured maximum number of processes ({max}) has been reached")]
    #[diagnostic(
        code(process::capacity_exceeded),
        help("Kill a process first, or add with --add-mode fifo or --add-mode prio.")
    )]
    CapacityExceeded { max: usize },

    #[error(
        "Could not add a new process: the configured maximum number of processes ({max}) has been reached \
         and no running process has a priority lower than {requested}"
    )]
    #[diagnostic(
        code(process::no_lower_priority),
        help("Priority eviction only replaces processes with a strictly lower priority.")
    )]
    NoLowerPriorityAvailable { requested: Priority, max: usize },

    #[error("Could not find a process with ID {0}")]
    #[diagnostic(
        code(process::not_found),
        help("The process may have been killed or evicted. List processes to check PID validity.")
    )]
    NotFound(Pid),

    #[error("Process store error: {0}")]
    #[diagnostic(
        code(process::store_error),
        help("The backing store failed. Check the database path and permissions.")
    )]
    Store(String),
}

impl ProcessError {
    /// Create a store error from any displayable cause
    pub fn store(cause: impl std::fmt::Display) -> Self {
        ProcessError::Store(cause.to_string())
    }

    /// True for the two admission-policy rejections
    #[inline]
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            ProcessError::CapacityExceeded { .. } | ProcessError::NoLowerPriorityAvailable { .. }
        )
    }
}
