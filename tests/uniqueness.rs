//! Uniqueness Enforcement Tests
//!
//! - a value already held by an existing entity is a conflict
//! - records sharing a proposed value are read and reported once
//! - exactly the distinct non-absent proposed values are read, one equality each
//! - an attribute with nothing to check issues no read

use datastore_criteria::model::{ModelMetadata, Record};
use datastore_criteria::observability::MetricsRegistry;
use datastore_criteria::store::{
    Entity, FilterValue, KeyId, MemoryStore, PathElement, StoreClient,
};
use datastore_criteria::unique::{ConflictList, UniquenessEnforcer};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn model() -> ModelMetadata {
    ModelMetadata::new("User")
        .with_unique("email", "email")
        .with_unique("handle", "handle_col")
}

fn seeded() -> MemoryStore {
    let store = MemoryStore::new();
    let key = store.key(vec![PathElement::with_id("User", KeyId::Id(1))]);
    store
        .insert(Entity::new(
            key,
            record(json!({"email": "taken@x", "handle_col": "taken"})),
        ))
        .unwrap();
    store
}

async fn check(store: &MemoryStore, records: &[Record]) -> ConflictList {
    let metrics = MetricsRegistry::new();
    UniquenessEnforcer::new(store, &metrics, 1000)
        .check(records, &model())
        .await
        .unwrap()
}

/// Values that appeared as equality filters on `column`, in issue order
fn queried_values(store: &MemoryStore, column: &str) -> Vec<Value> {
    store
        .executed_queries()
        .iter()
        .flat_map(|q| q.filters.iter())
        .filter(|f| f.property == column)
        .filter_map(|f| match &f.value {
            FilterValue::Value(v) => Some(v.clone()),
            FilterValue::Key(_) => None,
        })
        .collect()
}

// =============================================================================
// Conflict Tests
// =============================================================================

/// Two incoming records sharing a taken value give one conflict from one read.
#[tokio::test]
async fn test_shared_taken_value_conflicts() {
    let store = seeded();
    let conflicts = check(
        &store,
        &[
            record(json!({"email": "taken@x"})),
            record(json!({"email": "taken@x"})),
        ],
    )
    .await;

    assert_eq!(conflicts.len(), 1);
    assert!(conflicts.attr_names().contains(&"email".to_string()));
    assert!(conflicts.iter().all(|c| c.value == json!("taken@x")));
    assert_eq!(queried_values(&store, "email"), vec![json!("taken@x")]);
}

/// Conflicts on a mapped column report the attribute name.
#[tokio::test]
async fn test_conflict_reports_attribute_name() {
    let store = seeded();
    let conflicts = check(&store, &[record(json!({"handle_col": "taken"}))]).await;

    assert_eq!(conflicts.attr_names(), vec!["handle".to_string()]);

    let err = conflicts.into_result().unwrap_err();
    assert_eq!(err.code(), "E_UNIQUE");
    let body = err.to_json();
    assert_eq!(body["code"], "E_UNIQUE");
    assert_eq!(body["attrNames"], json!(["handle"]));
}

// =============================================================================
// Read Shape Tests
// =============================================================================

/// Without conflicts, the values read are exactly the distinct non-absent inputs.
#[tokio::test]
async fn test_reads_exactly_the_present_values() {
    let store = seeded();
    let conflicts = check(
        &store,
        &[
            record(json!({"email": "a@x", "handle_col": "a"})),
            record(json!({"email": null})),
            record(json!({"name": "no unique fields"})),
            record(json!({"email": "b@x"})),
            record(json!({"email": "a@x"})),
        ],
    )
    .await;

    assert!(conflicts.is_empty());
    assert_eq!(
        queried_values(&store, "email"),
        vec![json!("a@x"), json!("b@x")]
    );
    assert_eq!(queried_values(&store, "handle_col"), vec![json!("a")]);
}

/// Records with no unique values cause no store traffic.
#[tokio::test]
async fn test_nothing_to_check_issues_no_read() {
    let store = seeded();
    let conflicts = check(&store, &[record(json!({"name": "x"}))]).await;

    assert!(conflicts.is_empty());
    assert!(store.executed_queries().is_empty());
}

/// A store failure during the check is an error, not an empty list.
#[tokio::test]
async fn test_store_failure_is_not_a_pass() {
    let store = seeded();
    store.fail_next_queries(1);
    let metrics = MetricsRegistry::new();

    let err = UniquenessEnforcer::new(&store, &metrics, 1000)
        .check(&[record(json!({"email": "new@x"}))], &model())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E_STORE_EXECUTION");
}
