//! # Store Errors
//!
//! Failures of the store's query/write/delete primitives. The engine never
//! retries these; they are propagated to the caller as-is.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store primitive errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Stable error code for upward reporting
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::QueryFailed(_) => "E_STORE_QUERY",
            StoreError::WriteFailed(_) => "E_STORE_WRITE",
            StoreError::DeleteFailed(_) => "E_STORE_DELETE",
            StoreError::EntityNotFound(_) => "E_STORE_NOT_FOUND",
            StoreError::InvalidCursor(_) => "E_STORE_CURSOR",
            StoreError::Unavailable(_) => "E_STORE_UNAVAILABLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_code() {
        let err = StoreError::DeleteFailed("quota exceeded".into());
        assert_eq!(err.to_string(), "Delete failed: quota exceeded");
        assert_eq!(err.code(), "E_STORE_DELETE");
    }
}
