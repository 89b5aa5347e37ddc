//! Adapter configuration
//!
//! Loaded from a JSON file. Every field has a default, so `{}` is a valid config.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{Event, Logger};

/// Largest limit the store can represent (signed 32-bit)
pub const STORE_MAX_LIMIT: u64 = i32::MAX as u64;

/// Default number of keys fetched and deleted per drop page
pub const DEFAULT_DROP_PAGE_SIZE: u32 = 500;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Adapter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Store project identifier, informational only
    #[serde(default)]
    pub project_id: Option<String>,

    /// Namespace every key and query is scoped to
    #[serde(default)]
    pub namespace: Option<String>,

    /// Upper bound applied to every compiled limit (default: i32::MAX)
    #[serde(default = "default_max_query_limit")]
    pub max_query_limit: u64,

    /// Keys per page during recursive drop (default: 500)
    #[serde(default = "default_drop_page_size")]
    pub drop_page_size: u32,

    /// Emit a TRACE line per compiled query (default: false)
    #[serde(default)]
    pub log_queries: bool,
}

fn default_max_query_limit() -> u64 {
    STORE_MAX_LIMIT
}

fn default_drop_page_size() -> u32 {
    DEFAULT_DROP_PAGE_SIZE
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            namespace: None,
            max_query_limit: default_max_query_limit(),
            drop_page_size: default_drop_page_size(),
            log_queries: false,
        }
    }
}

impl AdapterConfig {
    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display.clone(),
            source,
        })?;
        config.validate()?;

        Logger::info(Event::ConfigLoaded, &[("path", display.as_str())]);
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.drop_page_size == 0 {
            return Err(ConfigError::Invalid("drop_page_size must be positive".into()));
        }
        if self.max_query_limit == 0 {
            return Err(ConfigError::Invalid("max_query_limit must be positive".into()));
        }
        if self.max_query_limit > STORE_MAX_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_query_limit {} exceeds store maximum {}",
                self.max_query_limit, STORE_MAX_LIMIT
            )));
        }
        Ok(())
    }

    /// Builder-style namespace override
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Builder-style drop page size override
    pub fn with_drop_page_size(mut self, size: u32) -> Self {
        self.drop_page_size = size;
        self
    }
}
