//! Uniqueness enforcement
//!
//! Read-before-write checks for attributes flagged unique. A non-empty
//! [`ConflictList`] must abort the write with an `E_UNIQUE` error.

mod conflict;
mod enforcer;
mod errors;

pub use conflict::{Conflict, ConflictList};
pub use enforcer::UniquenessEnforcer;
pub use errors::{EnforcerError, EnforcerResult, UniqueConstraintError};
