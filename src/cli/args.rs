//! CLI argument definitions using clap
//!
//! Commands:
//! - dsq explain --model <path> [--config <path>] [--criteria <json>] [--format json|text]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::io::OutputFormat;

/// dsq - inspect how criteria compile to native store queries
#[derive(Parser, Debug)]
#[command(name = "dsq")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the filter groups and native queries a criteria object compiles to
    Explain {
        /// Path to adapter configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to the model metadata JSON file
        #[arg(long)]
        model: PathBuf,

        /// Criteria JSON; read from stdin when omitted
        #[arg(long)]
        criteria: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
