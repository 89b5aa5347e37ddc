//! Adapter error types
//!
//! One error type for every adapter operation. Each variant keeps the code of
//! the layer that raised it.

use thiserror::Error;

use crate::bulk::BulkError;
use crate::executor::ExecutorError;
use crate::model::{RecordError, RegistryError};
use crate::planner::PlannerError;
use crate::store::StoreError;
use crate::unique::{EnforcerError, UniqueConstraintError};

/// Result type for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Enforcer(#[from] EnforcerError),

    #[error(transparent)]
    Unique(#[from] UniqueConstraintError),

    #[error(transparent)]
    Bulk(#[from] BulkError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AdapterError {
    /// Stable error code reported upward
    pub fn code(&self) -> &'static str {
        match self {
            AdapterError::Registry(e) => e.code(),
            AdapterError::Planner(e) => e.code().code(),
            AdapterError::Executor(e) => e.code(),
            AdapterError::Enforcer(e) => e.code(),
            AdapterError::Unique(e) => e.code(),
            AdapterError::Bulk(e) => e.code(),
            AdapterError::Record(_) => "E_QUERY_INVALID",
            AdapterError::Store(e) => e.code(),
        }
    }
}
