/*!
 * Task Manager Library
 * Bounded process registry with reject, FIFO and priority admission
 */

pub mod cli;
pub mod config;
pub mod core;
pub mod monitoring;
pub mod process;
pub mod shell;

// Re-exports
pub use cli::Cli;
pub use config::{ConfigError, StoreConfig, TaskManagerConfig};
pub use core::{Pid, ProcessError, ProcessResult, Timestamp};
pub use monitoring::init_tracing;
pub use process::{
    AddMode, Clock, ManualClock, MemoryStore, Priority, Process, ProcessRegistry,
    ProcessRegistryBuilder, ProcessStore, SortMode, SqliteStore, SystemClock,
};
pub use shell::{Shell, ShellCommand, TaskManagerCommands};
