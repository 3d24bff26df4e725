/*!
 * Task Manager - Main Entry Point
 *
 * Resolves configuration, builds the process registry over the configured
 * store, then either runs one command or starts the interactive shell.
 */

use clap::Parser;
use miette::IntoDiagnostic;
use std::sync::Arc;
use tracing::info;

use task_manager::{
    init_tracing, Cli, ProcessRegistry, ProcessStore, Shell, ShellCommand, SqliteStore,
    StoreConfig, TaskManagerCommands, TaskManagerConfig,
};

fn main() -> miette::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    let max_processes = config.validate()?;

    info!(
        max_processes = max_processes.get(),
        store = ?config.store,
        "Task manager starting"
    );

    match &config.store {
        StoreConfig::Memory => run(cli.command, &config, ProcessRegistry::in_memory(max_processes)),
        StoreConfig::Sqlite { path } => {
            let store = SqliteStore::open(path)?;
            run(
                cli.command,
                &config,
                ProcessRegistry::builder(store, max_processes).build(),
            )
        }
    }
}

fn run<S: ProcessStore>(
    command: Option<ShellCommand>,
    config: &TaskManagerConfig,
    registry: ProcessRegistry<S>,
) -> miette::Result<()> {
    let commands = TaskManagerCommands::new(Arc::new(registry))
        .with_defaults(config.default_add_mode, config.default_sort_mode);

    match command {
        Some(command) => {
            println!("{}", commands.execute(&command));
            Ok(())
        }
        None => Shell::new(commands).run().into_diagnostic(),
    }
}
