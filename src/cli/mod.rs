//! CLI module for dsq
//!
//! Provides command-line interface for:
//! - explain: one-shot criteria compilation, printed as JSON or text

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build_plan, explain, run, run_command};
pub use errors::{CliError, CliResult};
pub use io::{read_criteria, write_plan, OutputFormat};
