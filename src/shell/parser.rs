/*!
 * Shell Command Parsing
 * clap definitions shared by the interactive shell and the CLI subcommands
 */

use crate::core::types::Pid;
use clap::{Parser, Subcommand};

/// Task manager commands
///
/// Priority and mode names stay as text here; the command layer parses them
/// so unknown names produce the task manager's own error messages.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Add a process.
    AddProcess {
        /// Priority of the new process (low|medium|high)
        #[arg(long)]
        prio: String,

        /// What to do when the task manager is full (dflt|fifo|prio)
        #[arg(long)]
        add_mode: Option<String>,
    },

    /// Kill a process.
    KillProcess {
        #[arg(long)]
        pid: Pid,
    },

    /// Kill processes with the given priority.
    KillGroup {
        /// Priority to kill (low|medium|high)
        #[arg(long)]
        prio: String,
    },

    /// Kill all processes.
    KillAll,

    /// Get processes.
    GetProcesses {
        /// Listing order (start_time|pid|prio)
        #[arg(long)]
        sort_mode: Option<String>,
    },
}

impl ShellCommand {
    /// Command name as typed by the user
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            ShellCommand::AddProcess { .. } => "add-process",
            ShellCommand::KillProcess { .. } => "kill-process",
            ShellCommand::KillGroup { .. } => "kill-group",
            ShellCommand::KillAll => "kill-all",
            ShellCommand::GetProcesses { .. } => "get-processes",
        }
    }
}

/// One line typed into the interactive shell
#[derive(Parser, Debug)]
#[command(name = "taskman", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

/// Parse a shell line into a command
///
/// Help requests (`help`, `--help`) come back as a clap error whose text is
/// the help output.
pub fn parse_line(line: &str) -> Result<ShellCommand, clap::Error> {
    ShellLine::try_parse_from(line.split_whitespace()).map(|parsed| parsed.command)
}
