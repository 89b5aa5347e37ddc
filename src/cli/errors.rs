//! CLI errors
//!
//! Planning failures are not CLI errors: a rejected criteria object still
//! produces a plan. These cover everything around it.

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::config::ConfigError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Config file unreadable or invalid
    #[error("E_CLI_CONFIG: {0}")]
    Config(#[from] ConfigError),

    /// Model metadata file unreadable or malformed
    #[error("E_CLI_MODEL: {path}: {reason}")]
    Model { path: String, reason: String },

    /// Criteria input missing or not JSON
    #[error("E_CLI_INPUT: {0}")]
    Input(String),

    /// stdin/stdout failure
    #[error("E_CLI_IO: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    pub fn model(path: &Path, reason: impl ToString) -> Self {
        CliError::Model {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "E_CLI_CONFIG",
            CliError::Model { .. } => "E_CLI_MODEL",
            CliError::Input(_) => "E_CLI_INPUT",
            CliError::Io(_) => "E_CLI_IO",
        }
    }
}
