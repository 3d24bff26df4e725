/*!
 * Task Manager Commands
 * Turns shell commands into registry calls and one-line replies
 */

use super::parser::ShellCommand;
use crate::core::errors::ProcessResult;
use crate::core::types::Pid;
use crate::monitoring::CommandSpan;
use crate::process::{AddMode, MemoryStore, Priority, ProcessRegistry, ProcessStore, SortMode};
use std::sync::Arc;
use tracing::debug;

/// Command layer over an explicitly owned registry
pub struct TaskManagerCommands<S: ProcessStore = MemoryStore> {
    registry: Arc<ProcessRegistry<S>>,
    default_add_mode: AddMode,
    default_sort_mode: SortMode,
}

impl<S: ProcessStore> TaskManagerCommands<S> {
    pub fn new(registry: Arc<ProcessRegistry<S>>) -> Self {
        Self {
            registry,
            default_add_mode: AddMode::default(),
            default_sort_mode: SortMode::default(),
        }
    }

    /// Modes used when a command leaves them out
    pub fn with_defaults(mut self, add_mode: AddMode, sort_mode: SortMode) -> Self {
        self.default_add_mode = add_mode;
        self.default_sort_mode = sort_mode;
        self
    }

    pub fn registry(&self) -> &Arc<ProcessRegistry<S>> {
        &self.registry
    }

    /// Run a command; errors are returned as their message
    pub fn execute(&self, command: &ShellCommand) -> String {
        let span = CommandSpan::new(command.name());
        let _entered = span.enter();

        let result = match command {
            ShellCommand::AddProcess { prio, add_mode } => {
                self.add_process(prio, add_mode.as_deref())
            }
            ShellCommand::KillProcess { pid } => self.kill_process(*pid),
            ShellCommand::KillGroup { prio } => self.kill_group(prio),
            ShellCommand::KillAll => self.kill_all(),
            ShellCommand::GetProcesses { sort_mode } => self.get_processes(sort_mode.as_deref()),
        };

        match result {
            Ok(reply) => {
                span.record_success();
                reply
            }
            Err(err) => {
                let message = err.to_string();
                if err.is_rejection() {
                    span.record_rejection(&message);
                } else {
                    span.record_error(&message);
                    debug!(command = command.name(), error = %message, "Command failed");
                }
                message
            }
        }
    }

    fn add_process(&self, prio: &str, add_mode: Option<&str>) -> ProcessResult<String> {
        let priority: Priority = prio.parse()?;
        let mode = match add_mode {
            Some(name) => name.parse()?,
            None => self.default_add_mode,
        };

        let process = self.registry.add_process(priority, mode)?;
        Ok(format!("Created process with ID {}", process.pid))
    }

    fn kill_process(&self, pid: Pid) -> ProcessResult<String> {
        let process = self.registry.kill_process(pid)?;
        Ok(format!("Killed process with ID {}", process.pid))
    }

    fn kill_group(&self, prio: &str) -> ProcessResult<String> {
        let priority: Priority = prio.parse()?;
        let killed = self.registry.kill_group(priority)?;
        Ok(format!(
            "Killed {} process(es) with priority {}",
            killed, priority
        ))
    }

    fn kill_all(&self) -> ProcessResult<String> {
        let killed = self.registry.kill_all()?;
        Ok(format!("Killed all processes ({})", killed))
    }

    fn get_processes(&self, sort_mode: Option<&str>) -> ProcessResult<String> {
        let sort = match sort_mode {
            Some(name) => name.parse()?,
            None => self.default_sort_mode,
        };

        let processes = self.registry.list_processes(sort)?;
        if processes.is_empty() {
            return Ok("No running processes".to_string());
        }

        Ok(processes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
