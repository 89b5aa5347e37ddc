//! Executor error types
//!
//! Error codes:
//! - E_STORE_EXECUTION: one of the fanned-out store queries failed. The
//!   whole call fails; no partial results are returned.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// A store query failed during fan-out
#[derive(Debug, Clone, PartialEq, Error)]
#[error("E_STORE_EXECUTION: query {index} of {total} on kind '{kind}' failed: {source}")]
pub struct ExecutorError {
    /// Kind being queried
    pub kind: String,
    /// Position of the failed query in issue order
    pub index: usize,
    /// Number of queries in the fan-out
    pub total: usize,
    /// Store error, propagated verbatim
    #[source]
    pub source: StoreError,
}

impl ExecutorError {
    pub fn code(&self) -> &'static str {
        "E_STORE_EXECUTION"
    }

    pub fn store_error(&self) -> &StoreError {
        &self.source
    }
}
