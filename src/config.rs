/*!
 * Task Manager Configuration
 *
 * Layered startup configuration: built-in defaults, an optional JSON file,
 * environment variables, then command-line overrides.
 */

use crate::core::limits::{
    DEFAULT_DB_FILE, DEFAULT_MAX_PROCESSES, ENV_DB_PATH, ENV_MAX_PROCESSES, ENV_STORE,
};
use crate::process::types::{AddMode, SortMode};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration result
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Startup configuration errors; all of them are fatal
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Invalid maximum number of processes: {0}")]
    #[diagnostic(
        code(config::invalid_max_processes),
        help("max_processes must be a positive integer (at least 1).")
    )]
    InvalidMaxProcesses(String),

    #[error("Unknown store backend '{0}'")]
    #[diagnostic(code(config::invalid_store), help("Use 'memory' or 'sqlite'."))]
    InvalidStore(String),

    #[error("Could not read configuration file {}", .path.display())]
    #[diagnostic(code(config::read_failed))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse configuration file {}", .path.display())]
    #[diagnostic(
        code(config::parse_failed),
        help("The configuration file must be a JSON object with keys such as max_processes.")
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Process store selection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Processes live only as long as the registry
    #[default]
    Memory,
    /// Processes are persisted to a SQLite database
    Sqlite { path: PathBuf },
}

impl StoreConfig {
    /// Build a store selection from its name, using `path` for SQLite
    pub fn from_name(name: &str, path: Option<PathBuf>) -> ConfigResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreConfig::Memory),
            "sqlite" => Ok(StoreConfig::Sqlite {
                path: path.unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE)),
            }),
            _ => Err(ConfigError::InvalidStore(name.to_string())),
        }
    }
}

/// Task manager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TaskManagerConfig {
    /// Registry capacity; must be at least 1
    pub max_processes: usize,
    /// Admission mode used when a command does not name one
    pub default_add_mode: AddMode,
    /// Listing order used when a command does not name one
    pub default_sort_mode: SortMode,
    pub store: StoreConfig,
}

impl Default for TaskManagerConfig {
    fn default() -> Self {
        Self {
            max_processes: DEFAULT_MAX_PROCESSES,
            default_add_mode: AddMode::default(),
            default_sort_mode: SortMode::default(),
            store: StoreConfig::default(),
        }
    }
}

impl TaskManagerConfig {
    /// Load a JSON configuration file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `TASKMAN_*` overrides from the process environment
    pub fn apply_env(self) -> ConfigResult<Self> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply `TASKMAN_*` overrides from an arbitrary variable source
    pub fn apply_env_with(self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let max_processes = lookup(ENV_MAX_PROCESSES)
            .map(|raw| parse_max_processes(&raw))
            .transpose()?;

        self.with_overrides(
            max_processes,
            lookup(ENV_STORE).as_deref(),
            lookup(ENV_DB_PATH).map(PathBuf::from),
        )
    }

    /// Apply explicit overrides
    ///
    /// A database path on its own only moves an already selected SQLite store.
    pub fn with_overrides(
        mut self,
        max_processes: Option<usize>,
        store: Option<&str>,
        db_path: Option<PathBuf>,
    ) -> ConfigResult<Self> {
        if let Some(max_processes) = max_processes {
            self.max_processes = max_processes;
        }

        match store {
            Some(name) => {
                let path = db_path.or_else(|| match &self.store {
                    StoreConfig::Sqlite { path } => Some(path.clone()),
                    StoreConfig::Memory => None,
                });
                self.store = StoreConfig::from_name(name, path)?;
            }
            None => {
                if let (StoreConfig::Sqlite { path }, Some(db_path)) = (&mut self.store, db_path) {
                    *path = db_path;
                }
            }
        }

        Ok(self)
    }

    /// Check the configuration and return the registry capacity
    pub fn validate(&self) -> ConfigResult<NonZeroUsize> {
        NonZeroUsize::new(self.max_processes)
            .ok_or_else(|| ConfigError::InvalidMaxProcesses(self.max_processes.to_string()))
    }
}

/// Parse a capacity given as text
pub fn parse_max_processes(raw: &str) -> ConfigResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ConfigError::InvalidMaxProcesses(raw.to_string())),
    }
}
