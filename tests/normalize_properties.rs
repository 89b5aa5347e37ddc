//! Normalization and Compilation Properties
//!
//! - AND-only nesting yields one group holding every leaf
//! - `or: [A, B]` yields one AND-flattened group per branch
//! - primary-key equality compiles to a structural key lookup
//! - limits are clamped; zero or absent means no limit
//! - unsupported operators are surfaced, never dropped

use datastore_criteria::config::STORE_MAX_LIMIT;
use datastore_criteria::model::ModelMetadata;
use datastore_criteria::planner::{
    normalize, parse_where, Criteria, PlannerErrorCode, Predicate, QueryCompiler,
};
use datastore_criteria::store::{FilterValue, Key, KeyId, MemoryStore, PathElement, KEY_PROPERTY};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn compile(criteria: serde_json::Value) -> Vec<datastore_criteria::planner::CompiledQuery> {
    let store = MemoryStore::new();
    let model = ModelMetadata::new("Collection");
    let criteria = Criteria::from_json(&criteria).unwrap();
    let set = normalize(&criteria.where_clause).unwrap();
    QueryCompiler::new(&store, &model, STORE_MAX_LIMIT)
        .compile_all(&set, &criteria)
        .unwrap()
}

// =============================================================================
// DNF Shape Tests
// =============================================================================

/// Pure AND nesting flattens into a single group.
#[test]
fn test_and_nesting_is_one_group() {
    let clause = parse_where(&json!({
        "and": [
            {"a": 1},
            {"and": [{"b": 2}, {"and": [{"c": {">": 3}}, {"d": 4}]}]},
            {"e": "x"}
        ]
    }))
    .unwrap();

    let set = normalize(&clause).unwrap();
    assert_eq!(set.len(), 1);

    let fields: Vec<&str> = set.groups()[0].iter().map(|p| p.field.as_str()).collect();
    assert_eq!(fields, vec!["a", "b", "c", "d", "e"]);
}

/// Two conjunctive branches give two groups.
#[test]
fn test_or_of_conjunctions_is_two_groups() {
    let clause = parse_where(&json!({
        "or": [
            {"and": [{"a": 1}, {"b": 2}]},
            {"c": 3, "d": {"<=": 4}}
        ]
    }))
    .unwrap();

    let set = normalize(&clause).unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(
        set.groups()[0].predicates(),
        &[Predicate::eq("a", json!(1)), Predicate::eq("b", json!(2))]
    );
    assert_eq!(
        set.groups()[1].predicates(),
        &[Predicate::eq("c", json!(3)), Predicate::lte("d", json!(4))]
    );
}

/// An empty where-clause still yields one (empty) group.
#[test]
fn test_empty_where_is_never_an_empty_set() {
    for clause in [json!({}), json!(null)] {
        let set = normalize(&parse_where(&clause).unwrap()).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.groups()[0].is_empty());
    }
}

/// Not-in and pattern operators fail the whole normalization.
#[test]
fn test_unsupported_operators_surface() {
    for op in ["nin", "like", "contains", "startsWith", "endsWith"] {
        let operand = if op == "nin" { json!(["a"]) } else { json!("a") };
        let clause = parse_where(&json!({"or": [{"ok": 1}, {"name": {op: operand}}]})).unwrap();

        let err = normalize(&clause).unwrap_err();
        assert_eq!(err.code(), PlannerErrorCode::UnsupportedOperator, "{}", op);
        assert_eq!(err.operator(), Some(op));
    }
}

// =============================================================================
// Compilation Tests
// =============================================================================

/// `{id: 'abc'}` addresses key ('Collection', 'abc') and nothing else.
#[test]
fn test_primary_key_equality_compiles_to_key_lookup() {
    let queries = compile(json!({"where": {"id": "abc"}}));
    assert_eq!(queries.len(), 1);

    let query = queries[0].query();
    assert_eq!(query.filters.len(), 1);
    assert_eq!(query.filters[0].property, KEY_PROPERTY);
    assert_eq!(
        query.filters[0].value,
        FilterValue::Key(Key::new(
            None,
            vec![PathElement::with_id("Collection", KeyId::Name("abc".into()))]
        ))
    );
}

/// Every OR branch on the primary key is its own key lookup.
#[test]
fn test_primary_key_in_is_one_lookup_per_value() {
    let queries = compile(json!({"where": {"id": [1, 2, 3]}}));
    assert_eq!(queries.len(), 3);
    assert!(queries.iter().all(|q| q.key_lookup().is_some()));
}

/// Limits above the store maximum are clamped.
#[test]
fn test_limit_clamping() {
    let queries = compile(json!({"limit": 9_000_000_000u64}));
    assert_eq!(queries[0].query().limit, Some(STORE_MAX_LIMIT));

    let queries = compile(json!({"limit": 0}));
    assert_eq!(queries[0].query().limit, None);

    let queries = compile(json!({}));
    assert_eq!(queries[0].query().limit, None);
}

/// Sort, skip and select carry through to every group.
#[test]
fn test_sort_skip_select() {
    let queries = compile(json!({
        "where": {"or": [{"a": 1}, {"b": 2}]},
        "sort": "age DESC, id ASC",
        "skip": 10,
        "select": ["id", "age"]
    }));

    for compiled in &queries {
        let query = compiled.query();
        assert_eq!(query.offset, Some(10));
        assert_eq!(query.projection, vec!["age".to_string()]);
        assert_eq!(query.orders[0].property, "age");
        assert!(query.orders[0].descending);
        assert_eq!(query.orders[1].property, KEY_PROPERTY);
        assert!(!query.orders[1].descending);
    }
}
