/*!
 * Shell Module
 * Command interface: parsing, dispatch and the interactive loop
 */

pub mod commands;
pub mod parser;
pub mod repl;

pub use commands::TaskManagerCommands;
pub use parser::{parse_line, ShellCommand, ShellLine};
pub use repl::{LineOutcome, Shell};
