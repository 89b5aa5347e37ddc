//! Query executor
//!
//! Runs the native queries compiled from one criteria object and merges the
//! results.
//!
//! # Execution Flow
//!
//! 1. Issue every compiled query concurrently
//! 2. Fail the whole call on the first store error
//! 3. Concatenate pages in issue order
//! 4. Drop placeholders returned for deleted keys
//!
//! Results are not deduplicated across filter groups.

mod errors;
mod executor;
mod result;

pub use errors::{ExecutorError, ExecutorResult};
pub use executor::QueryExecutor;
pub use result::ResultSet;
