//! Bulk operation errors
//!
//! Error codes:
//! - E_DROP_FAILED: a page query or page delete failed. The drop stops at
//!   once; entities from earlier pages stay deleted.

use std::fmt;

use thiserror::Error;

use crate::store::StoreError;

/// Result type for bulk operations
pub type BulkResult<T> = Result<T, BulkError>;

/// Which round-trip of a page failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropStage {
    Query,
    Delete,
}

impl fmt::Display for DropStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropStage::Query => write!(f, "query"),
            DropStage::Delete => write!(f, "delete"),
        }
    }
}

/// A drop aborted part-way through
#[derive(Debug, Clone, PartialEq, Error)]
#[error("E_DROP_FAILED: {stage} failed dropping '{kind}' after {pages} page(s) and {deleted} deletion(s): {source}")]
pub struct BulkError {
    pub kind: String,
    pub stage: DropStage,
    /// Pages fully deleted before the failure
    pub pages: u64,
    /// Entities deleted before the failure
    pub deleted: u64,
    #[source]
    pub source: StoreError,
}

impl BulkError {
    pub fn code(&self) -> &'static str {
        "E_DROP_FAILED"
    }
}
