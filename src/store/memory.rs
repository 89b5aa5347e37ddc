//! In-memory store client
//!
//! Behaves like the remote store where the engine can observe it:
//! - per-call result cap; longer result sets continue via an end cursor
//! - equality key lookups return a `None` placeholder for missing entities
//! - cursors are opaque base64 tokens
//! - ids are allocated for incomplete keys
//!
//! Also records every query it runs and can inject failures, for tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, RwLock};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::client::{StoreClient, StoreFuture};
use super::entity::Entity;
use super::errors::{StoreError, StoreResult};
use super::filters::FilterMatcher;
use super::key::{Key, KeyId};
use super::query::{Cursor, MoreResults, PageInfo, QueryPage, StoreQuery};
use super::sorter::EntitySorter;

/// Entities returned per `run_query` call when no smaller limit applies
pub const DEFAULT_RESULT_CAP: usize = 1000;

/// What a cursor token decodes to
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum CursorPosition {
    /// Resume after this key (key-ordered queries)
    AfterKey(Key),
    /// Resume at this index of the sorted result (property-ordered queries)
    Offset(usize),
}

impl CursorPosition {
    fn encode(&self) -> StoreResult<Cursor> {
        let bytes =
            serde_json::to_vec(self).map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Ok(Cursor::from_token(URL_SAFE_NO_PAD.encode(bytes)))
    }

    fn decode(cursor: &Cursor) -> StoreResult<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(cursor.as_str())
            .map_err(|e| StoreError::InvalidCursor(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::InvalidCursor(e.to_string()))
    }
}

/// Pending injected failures
#[derive(Debug, Default)]
struct Faults {
    queries: u32,
    writes: u32,
    deletes: u32,
}

/// In-memory implementation of [`StoreClient`]
pub struct MemoryStore {
    namespace: Option<String>,
    entities: RwLock<BTreeMap<Key, Map<String, Value>>>,
    next_id: AtomicI64,
    result_cap: usize,
    faults: Mutex<Faults>,
    query_log: Mutex<Vec<StoreQuery>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            namespace: None,
            entities: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            result_cap: DEFAULT_RESULT_CAP,
            faults: Mutex::new(Faults::default()),
            query_log: Mutex::new(Vec::new()),
        }
    }

    /// Scope keys and queries to a namespace
    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    /// Override the per-call result cap
    pub fn with_result_cap(mut self, cap: usize) -> Self {
        self.result_cap = cap.max(1);
        self
    }

    /// Insert one entity directly, bypassing fault injection
    pub fn insert(&self, entity: Entity) -> StoreResult<Key> {
        let mut data = self.write_lock()?;
        let key = self.complete_key(entity.key)?;
        data.insert(key.clone(), entity.properties);
        Ok(key)
    }

    /// Remove one entity directly, as a concurrent writer would
    pub fn remove(&self, key: &Key) -> StoreResult<bool> {
        Ok(self.write_lock()?.remove(key).is_some())
    }

    /// Fetch one entity by key
    pub fn get(&self, key: &Key) -> StoreResult<Option<Entity>> {
        let data = self.read_lock()?;
        Ok(data.get(key).map(|p| Entity::new(key.clone(), p.clone())))
    }

    /// Number of entities of one kind in this store's namespace
    pub fn count(&self, kind: &str) -> StoreResult<usize> {
        let data = self.read_lock()?;
        Ok(data.keys().filter(|k| self.in_scope(k, kind)).count())
    }

    /// Fail the next `n` queries
    pub fn fail_next_queries(&self, n: u32) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.queries = n;
        }
    }

    /// Fail the next `n` save/update calls
    pub fn fail_next_writes(&self, n: u32) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.writes = n;
        }
    }

    /// Fail the next `n` delete calls
    pub fn fail_next_deletes(&self, n: u32) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.deletes = n;
        }
    }

    /// Every query run so far, in execution order
    pub fn executed_queries(&self) -> Vec<StoreQuery> {
        self.query_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    pub fn clear_query_log(&self) {
        if let Ok(mut log) = self.query_log.lock() {
            log.clear();
        }
    }

    fn read_lock(
        &self,
    ) -> StoreResult<std::sync::RwLockReadGuard<'_, BTreeMap<Key, Map<String, Value>>>> {
        self.entities
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn write_lock(
        &self,
    ) -> StoreResult<std::sync::RwLockWriteGuard<'_, BTreeMap<Key, Map<String, Value>>>> {
        self.entities
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn in_scope(&self, key: &Key, kind: &str) -> bool {
        key.namespace == self.namespace && key.kind() == kind
    }

    fn complete_key(&self, key: Key) -> StoreResult<Key> {
        if key.path.is_empty() {
            return Err(StoreError::WriteFailed("key has an empty path".into()));
        }
        if key.is_complete() {
            Ok(key)
        } else {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            Ok(key.complete_with(KeyId::Id(id)))
        }
    }

    /// Consume one pending fault from the selected counter
    fn take_fault(&self, select: impl FnOnce(&mut Faults) -> &mut u32) -> StoreResult<bool> {
        let mut faults = self
            .faults
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let pending = select(&mut faults);
        if *pending > 0 {
            *pending -= 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn shape(query: &StoreQuery, entity: Entity) -> Entity {
        if query.keys_only {
            Entity::key_only(entity.key)
        } else if query.projection.is_empty() {
            entity
        } else {
            let properties = entity
                .properties
                .into_iter()
                .filter(|(name, _)| query.projection.contains(name))
                .collect();
            Entity::new(entity.key, properties)
        }
    }

    fn execute(&self, query: &StoreQuery) -> StoreResult<QueryPage> {
        if let Ok(mut log) = self.query_log.lock() {
            log.push(query.clone());
        }
        if self.take_fault(|f| &mut f.queries)? {
            return Err(StoreError::QueryFailed(format!(
                "injected failure on kind '{}'",
                query.kind
            )));
        }

        if let (Some(key), None) = (query.key_lookup(), &query.start) {
            return self.execute_lookup(query, key);
        }

        let mut matched: Vec<Entity> = {
            let data = self.read_lock()?;
            data.iter()
                .filter(|(k, _)| k.namespace == query.namespace && k.kind() == query.kind)
                .map(|(k, p)| Entity::new(k.clone(), p.clone()))
                .filter(|e| FilterMatcher::matches(e, &query.filters))
                .collect()
        };
        EntitySorter::sort(&mut matched, &query.orders);

        // Key-ordered results resume after a key, so entities deleted between
        // pages do not shift the position. Property orders resume by index.
        let start = match &query.start {
            None => 0,
            Some(cursor) => match CursorPosition::decode(cursor)? {
                CursorPosition::AfterKey(after) => matched.partition_point(|e| e.key <= after),
                CursorPosition::Offset(index) => index.min(matched.len()),
            },
        };

        let skip = query.offset.unwrap_or(0) as usize;
        let first = start.saturating_add(skip).min(matched.len());
        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        let end = first
            .saturating_add(limit.min(self.result_cap))
            .min(matched.len());

        let more_results = if end == matched.len() {
            MoreResults::NoMoreResults
        } else if end - first == limit {
            MoreResults::MoreResultsAfterLimit
        } else {
            MoreResults::NotFinished
        };

        let end_cursor = if end > first {
            let position = if query.orders.is_empty() {
                CursorPosition::AfterKey(matched[end - 1].key.clone())
            } else {
                CursorPosition::Offset(end)
            };
            Some(position.encode()?)
        } else {
            query.start.clone()
        };

        let entities = matched
            .drain(first..end)
            .map(|e| Some(Self::shape(query, e)))
            .collect();

        Ok(QueryPage {
            entities,
            info: PageInfo {
                end_cursor,
                more_results,
            },
        })
    }

    /// Single-key lookup: the entity, a placeholder if it is gone, or nothing
    /// if it exists but fails the remaining filters.
    fn execute_lookup(&self, query: &StoreQuery, key: &Key) -> StoreResult<QueryPage> {
        if query.offset.unwrap_or(0) > 0 || key.kind() != query.kind {
            return Ok(QueryPage {
                entities: Vec::new(),
                info: PageInfo::exhausted(),
            });
        }

        let found = self.get(key)?;
        let entities = match found {
            None => vec![None],
            Some(entity) if FilterMatcher::matches(&entity, &query.filters) => {
                vec![Some(Self::shape(query, entity))]
            }
            Some(_) => Vec::new(),
        };

        Ok(QueryPage {
            entities,
            info: PageInfo::exhausted(),
        })
    }

    fn save_all(&self, entities: Vec<Entity>) -> StoreResult<Vec<Key>> {
        if self.take_fault(|f| &mut f.writes)? {
            return Err(StoreError::WriteFailed("injected failure".into()));
        }
        let mut data = self.write_lock()?;
        let mut keys = Vec::with_capacity(entities.len());
        for entity in entities {
            let key = self.complete_key(entity.key)?;
            data.insert(key.clone(), entity.properties);
            keys.push(key);
        }
        Ok(keys)
    }

    fn update_all(&self, entities: Vec<Entity>) -> StoreResult<()> {
        if self.take_fault(|f| &mut f.writes)? {
            return Err(StoreError::WriteFailed("injected failure".into()));
        }
        let mut data = self.write_lock()?;
        if let Some(missing) = entities.iter().find(|e| !data.contains_key(&e.key)) {
            return Err(StoreError::EntityNotFound(missing.key.to_string()));
        }
        for entity in entities {
            data.insert(entity.key, entity.properties);
        }
        Ok(())
    }

    fn delete_all(&self, keys: Vec<Key>) -> StoreResult<()> {
        if self.take_fault(|f| &mut f.deletes)? {
            return Err(StoreError::DeleteFailed("injected failure".into()));
        }
        let mut data = self.write_lock()?;
        for key in &keys {
            data.remove(key);
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreClient for MemoryStore {
    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn run_query(&self, query: StoreQuery) -> StoreFuture<'_, QueryPage> {
        Box::pin(async move {
            // Every round-trip suspends, like a network call would.
            tokio::task::yield_now().await;
            self.execute(&query)
        })
    }

    fn save(&self, entities: Vec<Entity>) -> StoreFuture<'_, Vec<Key>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.save_all(entities)
        })
    }

    fn update(&self, entities: Vec<Entity>) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.update_all(entities)
        })
    }

    fn delete(&self, keys: Vec<Key>) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.delete_all(keys)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::key::PathElement;
    use crate::store::query::NativeOp;
    use serde_json::json;

    fn user(store: &MemoryStore, id: i64, props: Value) -> Key {
        let key = store.key(vec![PathElement::with_id("User", KeyId::Id(id))]);
        store
            .insert(Entity::new(key, props.as_object().cloned().unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_filter_order_limit() {
        let store = MemoryStore::new();
        for i in 1..=5 {
            user(&store, i, json!({"age": 20 + i}));
        }

        let query = store
            .create_query("User")
            .filter("age", NativeOp::GreaterThan, json!(22))
            .order("age", true)
            .limit(2);
        let page = store.run_query(query).await.unwrap();

        let ages: Vec<Value> = page
            .entities
            .iter()
            .map(|e| e.as_ref().unwrap().properties["age"].clone())
            .collect();
        assert_eq!(ages, vec![json!(25), json!(24)]);
        assert_eq!(page.info.more_results, MoreResults::MoreResultsAfterLimit);
        assert!(page.info.end_cursor.is_some());
    }

    #[tokio::test]
    async fn test_cursor_resumes_after_deleted_page() {
        let store = MemoryStore::new();
        for i in 1..=5 {
            user(&store, i, json!({}));
        }

        let first = store
            .run_query(store.create_query("User").keys_only().limit(2))
            .await
            .unwrap();
        let keys: Vec<Key> = first.entities.into_iter().flatten().map(Entity::into_key).collect();
        store.delete(keys).await.unwrap();

        let cursor = first.info.end_cursor.unwrap();
        let second = store
            .run_query(store.create_query("User").keys_only().limit(2).start(cursor))
            .await
            .unwrap();
        let ids: Vec<KeyId> = second
            .entities
            .iter()
            .map(|e| e.as_ref().unwrap().key.id().cloned().unwrap())
            .collect();
        assert_eq!(ids, vec![KeyId::Id(3), KeyId::Id(4)]);
    }

    #[tokio::test]
    async fn test_result_cap_reports_not_finished() {
        let store = MemoryStore::new().with_result_cap(2);
        for i in 1..=3 {
            user(&store, i, json!({}));
        }

        let page = store.run_query(store.create_query("User")).await.unwrap();
        assert_eq!(page.entities.len(), 2);
        assert_eq!(page.info.more_results, MoreResults::NotFinished);
    }

    #[tokio::test]
    async fn test_missing_key_lookup_returns_placeholder() {
        let store = MemoryStore::new();
        let key = store.key(vec![PathElement::with_id("User", KeyId::Name("gone".into()))]);

        let page = store
            .run_query(store.create_query("User").key_filter(NativeOp::Equal, key))
            .await
            .unwrap();
        assert_eq!(page.entities, vec![None]);
        assert_eq!(page.info.more_results, MoreResults::NoMoreResults);
    }

    #[tokio::test]
    async fn test_projection_and_keys_only() {
        let store = MemoryStore::new();
        user(&store, 1, json!({"email": "a@x", "name": "A"}));

        let page = store
            .run_query(store.create_query("User").select(vec!["email".into()]))
            .await
            .unwrap();
        let entity = page.entities[0].as_ref().unwrap();
        assert_eq!(entity.properties.len(), 1);
        assert_eq!(entity.properties["email"], "a@x");

        let page = store
            .run_query(store.create_query("User").keys_only())
            .await
            .unwrap();
        assert!(page.entities[0].as_ref().unwrap().properties.is_empty());
    }

    #[tokio::test]
    async fn test_save_allocates_ids_and_update_requires_existing() {
        let store = MemoryStore::new();
        let incomplete = store.key(vec![PathElement::incomplete("User")]);

        let keys = store
            .save(vec![Entity::key_only(incomplete.clone()), Entity::key_only(incomplete)])
            .await
            .unwrap();
        assert!(keys.iter().all(Key::is_complete));
        assert_ne!(keys[0], keys[1]);

        let ghost = store.key(vec![PathElement::with_id("User", KeyId::Id(999))]);
        let err = store.update(vec![Entity::key_only(ghost)]).await.unwrap_err();
        assert!(matches!(err, StoreError::EntityNotFound(_)));
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let store = MemoryStore::new().with_namespace(Some("a".into()));
        user(&store, 1, json!({}));
        let other = Key::new(Some("b".into()), vec![PathElement::with_id("User", KeyId::Id(2))]);
        store.insert(Entity::key_only(other)).unwrap();

        assert_eq!(store.count("User").unwrap(), 1);
        let page = store.run_query(store.create_query("User")).await.unwrap();
        assert_eq!(page.entities.len(), 1);
    }

    #[tokio::test]
    async fn test_fault_injection_and_query_log() {
        let store = MemoryStore::new();
        store.fail_next_queries(1);

        assert!(store.run_query(store.create_query("User")).await.is_err());
        assert!(store.run_query(store.create_query("User")).await.is_ok());
        assert_eq!(store.executed_queries().len(), 2);

        store.fail_next_deletes(1);
        let err = store.delete(vec![]).await.unwrap_err();
        assert_eq!(err.code(), "E_STORE_DELETE");
    }

    #[tokio::test]
    async fn test_garbage_cursor_rejected() {
        let store = MemoryStore::new();
        let query = store.create_query("User").start(Cursor::from_token("%%%"));
        let err = store.run_query(query).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidCursor(_)));
    }
}
