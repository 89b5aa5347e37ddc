//! Adapter boundary
//!
//! Exposes the engine's three contracts to the ORM:
//!
//! - `compile_and_execute`: read path
//! - `enforce_uniqueness`: pre-write gate
//! - `drop_all`: bulk delete
//!
//! plus the find/count/create/update/destroy operations built on them.

mod adapter;
mod context;
mod errors;

pub use adapter::DatastoreAdapter;
pub use context::AdapterContext;
pub use errors::{AdapterError, AdapterResult};
