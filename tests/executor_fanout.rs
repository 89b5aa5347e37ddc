//! Executor Fan-out Tests
//!
//! - pages are concatenated in issue order
//! - placeholders for deleted keys are dropped, not surfaced as holes
//! - overlapping OR branches are not deduplicated
//! - the first store failure fails the whole call
//! - a query the store answers in partial batches is read to the end

use datastore_criteria::model::ModelMetadata;
use datastore_criteria::observability::MetricsRegistry;
use datastore_criteria::planner::{normalize, parse_where, Criteria, QueryCompiler};
use datastore_criteria::store::{Entity, KeyId, MemoryStore, PathElement, StoreClient};
use datastore_criteria::executor::{QueryExecutor, ResultSet};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn seed(store: &MemoryStore, id: &str, props: Value) {
    let key = store.key(vec![PathElement::with_id("User", KeyId::Name(id.into()))]);
    store
        .insert(Entity::new(key, props.as_object().cloned().unwrap()))
        .unwrap();
}

async fn run(store: &MemoryStore, metrics: &MetricsRegistry, where_clause: Value) -> ResultSet {
    let model = ModelMetadata::new("User");
    let criteria = Criteria::new().with_where(parse_where(&where_clause).unwrap());
    let set = normalize(&criteria.where_clause).unwrap();
    let queries = QueryCompiler::new(store, &model, 1000)
        .compile_all(&set, &criteria)
        .unwrap();
    QueryExecutor::new(store, metrics).execute(queries).await.unwrap()
}

fn names(result: &ResultSet) -> Vec<String> {
    result
        .iter()
        .map(|e| match e.key.id() {
            Some(KeyId::Name(name)) => name.clone(),
            other => format!("{:?}", other),
        })
        .collect()
}

// =============================================================================
// Merge Tests
// =============================================================================

/// A lookup of a deleted key is absent from the result, not a hole.
#[tokio::test]
async fn test_deleted_key_absent_from_result() {
    let store = MemoryStore::new();
    seed(&store, "a", json!({}));
    seed(&store, "c", json!({}));
    let metrics = MetricsRegistry::new();

    let result = run(&store, &metrics, json!({"id": ["a", "b", "c"]})).await;

    assert_eq!(names(&result), vec!["a", "c"]);
    assert_eq!(result.queries_issued, 3);
    assert_eq!(result.placeholders_filtered, 1);
}

/// Branch results are concatenated in branch order.
#[tokio::test]
async fn test_issue_order_preserved() {
    let store = MemoryStore::new();
    seed(&store, "a", json!({"role": "admin"}));
    seed(&store, "b", json!({"role": "user"}));
    let metrics = MetricsRegistry::new();

    let result = run(&store, &metrics, json!({"or": [{"role": "user"}, {"role": "admin"}]})).await;
    assert_eq!(names(&result), vec!["b", "a"]);
}

/// An entity matching two branches appears twice.
#[tokio::test]
async fn test_overlapping_branches_not_deduplicated() {
    let store = MemoryStore::new();
    seed(&store, "a", json!({"role": "admin", "age": 40}));
    let metrics = MetricsRegistry::new();

    let result = run(&store, &metrics, json!({"or": [{"role": "admin"}, {"age": {">": 30}}]})).await;
    assert_eq!(names(&result), vec!["a", "a"]);
    assert_eq!(metrics.snapshot().entities_returned, 2);
}

/// One failing branch fails the call with no partial result.
#[tokio::test]
async fn test_fail_fast_on_store_error() {
    let store = MemoryStore::new();
    seed(&store, "a", json!({"role": "admin"}));
    store.fail_next_queries(1);
    let metrics = MetricsRegistry::new();

    let model = ModelMetadata::new("User");
    let criteria = Criteria::new()
        .with_where(parse_where(&json!({"or": [{"role": "admin"}, {"role": "user"}]})).unwrap());
    let set = normalize(&criteria.where_clause).unwrap();
    let queries = QueryCompiler::new(&store, &model, 1000)
        .compile_all(&set, &criteria)
        .unwrap();

    let err = QueryExecutor::new(&store, &metrics)
        .execute(queries)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E_STORE_EXECUTION");
    assert_eq!(err.total, 2);
    assert_eq!(metrics.snapshot().store_failures, 1);
}

// =============================================================================
// Partial Batch Tests
// =============================================================================

async fn run_with(store: &MemoryStore, criteria: Value) -> ResultSet {
    let model = ModelMetadata::new("User");
    let criteria = Criteria::from_json(&criteria).unwrap();
    let set = normalize(&criteria.where_clause).unwrap();
    let queries = QueryCompiler::new(store, &model, 1000)
        .compile_all(&set, &criteria)
        .unwrap();
    QueryExecutor::new(store, &MetricsRegistry::new())
        .execute(queries)
        .await
        .unwrap()
}

/// A store that stops each batch at three results still yields every match.
#[tokio::test]
async fn test_capped_store_returns_every_match() {
    let store = MemoryStore::new().with_result_cap(3);
    for id in ["a", "b", "c", "d", "e"] {
        seed(&store, id, json!({"role": "user"}));
    }

    let result = run_with(&store, json!({})).await;

    assert_eq!(names(&result), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(result.queries_issued, 1);
    assert_eq!(result.batches_run, 2);
}

/// A limit larger than one batch is filled from the following batch.
#[tokio::test]
async fn test_limit_filled_across_batches() {
    let store = MemoryStore::new().with_result_cap(3);
    for id in ["a", "b", "c", "d", "e"] {
        seed(&store, id, json!({}));
    }

    let result = run_with(&store, json!({"limit": 4})).await;
    assert_eq!(names(&result), vec!["a", "b", "c", "d"]);
}

/// Every OR branch is drained, and each branch's batches stay contiguous.
#[tokio::test]
async fn test_each_branch_drained_in_order() {
    let store = MemoryStore::new().with_result_cap(1);
    seed(&store, "a", json!({"role": "admin"}));
    seed(&store, "b", json!({"role": "user"}));
    seed(&store, "c", json!({"role": "user"}));
    seed(&store, "d", json!({"role": "admin"}));

    let result = run_with(
        &store,
        json!({"where": {"or": [{"role": "user"}, {"role": "admin"}]}}),
    )
    .await;

    assert_eq!(names(&result), vec!["b", "c", "a", "d"]);
    assert_eq!(result.batches_run, 4);
}
