//! Bulk structural operations
//!
//! Recursive deletion of a whole kind, paged with store-issued cursors.

mod deleter;
mod errors;

pub use deleter::{DropState, DropSummary, RecursiveDeleter};
pub use errors::{BulkError, BulkResult, DropStage};
