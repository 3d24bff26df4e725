/*!
 * Command Line
 * Top-level `taskman` arguments and configuration resolution
 */

use crate::config::{ConfigResult, TaskManagerConfig};
use crate::shell::ShellCommand;
use clap::Parser;
use std::path::PathBuf;

/// taskman - bounded task manager with FIFO and priority eviction
#[derive(Parser, Debug)]
#[command(name = "taskman")]
#[command(version)]
#[command(about = "Bounded task manager with FIFO and priority eviction")]
#[command(
    long_about = "Bounded task manager with FIFO and priority eviction.\n\nWithout a subcommand an interactive shell is started. With a subcommand that one command runs and its reply is printed; use the sqlite store to keep processes between invocations."
)]
pub struct Cli {
    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum number of running processes (at least 1)
    #[arg(long, value_name = "N")]
    pub max_processes: Option<usize>,

    /// Process store backend (memory|sqlite)
    #[arg(long, value_name = "BACKEND")]
    pub store: Option<String>,

    /// SQLite database path for the sqlite store
    #[arg(long, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<ShellCommand>,
}

impl Cli {
    /// Resolve configuration: defaults, file, environment, then flags
    pub fn resolve_config(&self) -> ConfigResult<TaskManagerConfig> {
        self.resolve_config_with(|key| std::env::var(key).ok())
    }

    /// Same as `resolve_config` with an explicit environment source
    pub fn resolve_config_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<TaskManagerConfig> {
        let base = match &self.config {
            Some(path) => TaskManagerConfig::from_file(path)?,
            None => TaskManagerConfig::default(),
        };

        base.apply_env_with(lookup)?.with_overrides(
            self.max_processes,
            self.store.as_deref(),
            self.db_path.clone(),
        )
    }
}
