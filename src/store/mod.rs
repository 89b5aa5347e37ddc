//! Store subsystem
//!
//! The boundary between the criteria engine and the key/value document store.
//!
//! - `StoreClient`: the capability the engine consumes (queries, keys, writes)
//! - `StoreQuery`: native conjunctive query with optional key filter and cursor
//! - `MemoryStore`: in-process client with the same paging and placeholder
//!   behaviour as the remote store

mod client;
mod entity;
mod errors;
mod filters;
mod key;
mod memory;
mod query;
mod sorter;

pub use client::{StoreClient, StoreFuture};
pub use entity::Entity;
pub use errors::{StoreError, StoreResult};
pub use key::{Key, KeyId, PathElement};
pub use memory::{MemoryStore, DEFAULT_RESULT_CAP};
pub use query::{
    Cursor, FilterValue, MoreResults, NativeOp, PageInfo, PropertyFilter, PropertyOrder,
    QueryPage, StoreQuery, KEY_PROPERTY,
};
