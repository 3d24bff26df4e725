/*!
 * Interactive Shell
 * Read-eval-print loop over the task manager commands
 */

use super::commands::TaskManagerCommands;
use super::parser::parse_line;
use crate::process::{MemoryStore, ProcessStore};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

const PROMPT: &str = "taskman> ";

/// Result of handling one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank line, nothing to print
    Empty,
    /// User asked to leave the shell
    Exit,
    /// Text to print
    Output(String),
}

/// Interactive task manager shell
pub struct Shell<S: ProcessStore = MemoryStore> {
    commands: TaskManagerCommands<S>,
}

impl<S: ProcessStore> Shell<S> {
    pub fn new(commands: TaskManagerCommands<S>) -> Self {
        Self { commands }
    }

    /// Handle one line of input without touching the terminal
    pub fn handle_line(&self, line: &str) -> LineOutcome {
        let line = line.trim();
        if line.is_empty() {
            return LineOutcome::Empty;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            return LineOutcome::Exit;
        }

        match parse_line(line) {
            Ok(command) => LineOutcome::Output(self.commands.execute(&command)),
            Err(err) => LineOutcome::Output(err.to_string().trim_end().to_string()),
        }
    }

    /// Run until `exit`, end of input or a terminal error
    pub fn run(&self) -> Result<(), ReadlineError> {
        let mut editor = DefaultEditor::new()?;
        let registry = self.commands.registry();

        println!(
            "Task manager ready: up to {} processes ({} store).",
            registry.max_processes(),
            registry.backend()
        );
        println!("Type 'help' for commands, 'exit' to quit.");

        loop {
            match editor.readline(PROMPT) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        editor.add_history_entry(line.as_str())?;
                    }
                    match self.handle_line(&line) {
                        LineOutcome::Empty => {}
                        LineOutcome::Exit => break,
                        LineOutcome::Output(text) => println!("{}", text),
                    }
                }
                // Ctrl-C drops the current line only
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err),
            }
        }

        debug!("Shell exited");
        Ok(())
    }
}
