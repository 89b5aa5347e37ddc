//! Store client capability
//!
//! The engine only talks to the store through this trait. Transport, auth
//! and consistency all live behind it.

use std::future::Future;
use std::pin::Pin;

use super::entity::Entity;
use super::errors::StoreResult;
use super::key::{Key, PathElement};
use super::query::{QueryPage, StoreQuery};

/// Boxed future returned by store round-trips
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Store client capability
pub trait StoreClient: Send + Sync {
    /// Namespace all keys and queries are scoped to
    fn namespace(&self) -> Option<&str> {
        None
    }

    /// Start a query over one kind
    fn create_query(&self, kind: &str) -> StoreQuery {
        StoreQuery::new(kind).namespace(self.namespace().map(str::to_string))
    }

    /// Build a key from path segments
    fn key(&self, path: Vec<PathElement>) -> Key {
        Key::new(self.namespace().map(str::to_string), path)
    }

    /// Run one query and return one page
    fn run_query(&self, query: StoreQuery) -> StoreFuture<'_, QueryPage>;

    /// Upsert entities. Incomplete keys get ids allocated; returns the final keys.
    fn save(&self, entities: Vec<Entity>) -> StoreFuture<'_, Vec<Key>>;

    /// Overwrite existing entities. Fails if any is missing.
    fn update(&self, entities: Vec<Entity>) -> StoreFuture<'_, ()>;

    /// Delete by key. Missing keys are not an error.
    fn delete(&self, keys: Vec<Key>) -> StoreFuture<'_, ()>;
}
