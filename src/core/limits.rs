/*!
 * Task Manager Limits and Defaults
 *
 * Centralized location for capacity defaults and configuration keys.
 */

// =============================================================================
// REGISTRY
// =============================================================================

/// Default registry capacity when nothing else is configured
pub const DEFAULT_MAX_PROCESSES: usize = 10;

/// First PID handed out by a fresh store
/// PID 0 is never assigned
pub const FIRST_PID: u32 = 1;

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Registry capacity override
pub const ENV_MAX_PROCESSES: &str = "TASKMAN_MAX_PROCESSES";

/// Store backend selection (`memory` or `sqlite`)
pub const ENV_STORE: &str = "TASKMAN_STORE";

/// SQLite database path for the persisted store
pub const ENV_DB_PATH: &str = "TASKMAN_DB_PATH";

/// Enables JSON log output when set to `1` or `true`
pub const ENV_TRACE_JSON: &str = "TASKMAN_TRACE_JSON";

/// Default SQLite database file name
pub const DEFAULT_DB_FILE: &str = "taskman.db";

// =============================================================================
// TRACING
// =============================================================================

/// Commands slower than this are logged at warn level (milliseconds)
pub const SLOW_COMMAND_THRESHOLD_MS: u128 = 10;
