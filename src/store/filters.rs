//! Filter evaluation for the in-memory store
//!
//! Matches the store's conjunctive semantics:
//! - missing property never matches
//! - no type coercion (string "5" is not 5)
//! - range comparisons only between same-typed values
//! - an array property matches if any element matches

use std::cmp::Ordering;

use serde_json::Value;

use super::entity::Entity;
use super::query::{FilterValue, NativeOp, PropertyFilter};

/// Evaluates native filters against entities
pub(crate) struct FilterMatcher;

impl FilterMatcher {
    /// True if the entity satisfies every filter (AND semantics)
    pub fn matches(entity: &Entity, filters: &[PropertyFilter]) -> bool {
        filters.iter().all(|f| Self::matches_filter(entity, f))
    }

    fn matches_filter(entity: &Entity, filter: &PropertyFilter) -> bool {
        match &filter.value {
            FilterValue::Key(key) => Self::holds(filter.op, entity.key.cmp(key)),
            FilterValue::Value(expected) => match entity.property(&filter.property) {
                None => false,
                Some(Value::Array(items)) => items
                    .iter()
                    .any(|item| Self::matches_value(item, filter.op, expected)),
                Some(actual) => Self::matches_value(actual, filter.op, expected),
            },
        }
    }

    fn matches_value(actual: &Value, op: NativeOp, expected: &Value) -> bool {
        match op {
            NativeOp::Equal => actual == expected,
            NativeOp::NotEqual => actual != expected,
            _ => Self::compare(actual, expected)
                .map(|ordering| Self::holds(op, ordering))
                .unwrap_or(false),
        }
    }

    /// Same-type comparison. Mixed types are incomparable.
    fn compare(actual: &Value, bound: &Value) -> Option<Ordering> {
        match (actual, bound) {
            (Value::Number(a), Value::Number(b)) => {
                if let (Some(ai), Some(bi)) = (a.as_i64(), b.as_i64()) {
                    return Some(ai.cmp(&bi));
                }
                a.as_f64()?.partial_cmp(&b.as_f64()?)
            }
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    fn holds(op: NativeOp, ordering: Ordering) -> bool {
        match op {
            NativeOp::Equal => ordering == Ordering::Equal,
            NativeOp::NotEqual => ordering != Ordering::Equal,
            NativeOp::LessThan => ordering == Ordering::Less,
            NativeOp::LessThanOrEqual => ordering != Ordering::Greater,
            NativeOp::GreaterThan => ordering == Ordering::Greater,
            NativeOp::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::key::{Key, KeyId, PathElement};
    use crate::store::query::StoreQuery;
    use serde_json::json;

    fn entity(id: i64, props: Value) -> Entity {
        let key = Key::new(None, vec![PathElement::with_id("User", KeyId::Id(id))]);
        Entity::new(key, props.as_object().cloned().unwrap())
    }

    fn filters(q: StoreQuery) -> Vec<PropertyFilter> {
        q.filters
    }

    #[test]
    fn test_equality_without_coercion() {
        let e = entity(1, json!({"value": 123}));

        let f = filters(StoreQuery::new("User").filter("value", NativeOp::Equal, json!(123)));
        assert!(FilterMatcher::matches(&e, &f));

        let f = filters(StoreQuery::new("User").filter("value", NativeOp::Equal, json!("123")));
        assert!(!FilterMatcher::matches(&e, &f));
    }

    #[test]
    fn test_range_predicates() {
        let e = entity(1, json!({"age": 25}));

        let q = |op, v| filters(StoreQuery::new("User").filter("age", op, v));
        assert!(FilterMatcher::matches(&e, &q(NativeOp::GreaterThanOrEqual, json!(25))));
        assert!(!FilterMatcher::matches(&e, &q(NativeOp::GreaterThan, json!(25))));
        assert!(FilterMatcher::matches(&e, &q(NativeOp::LessThan, json!(30.5))));
        assert!(!FilterMatcher::matches(&e, &q(NativeOp::LessThan, json!("30"))));
    }

    #[test]
    fn test_missing_property_never_matches() {
        let e = entity(1, json!({"name": "Alice"}));
        let f = filters(StoreQuery::new("User").filter("age", NativeOp::NotEqual, json!(3)));
        assert!(!FilterMatcher::matches(&e, &f));
    }

    #[test]
    fn test_array_property_matches_any_element() {
        let e = entity(1, json!({"tags": ["red", "blue"]}));
        let f = filters(StoreQuery::new("User").filter("tags", NativeOp::Equal, json!("blue")));
        assert!(FilterMatcher::matches(&e, &f));
    }

    #[test]
    fn test_key_filters() {
        let e = entity(5, json!({}));
        let key = |id| Key::new(None, vec![PathElement::with_id("User", KeyId::Id(id))]);

        let f = filters(StoreQuery::new("User").key_filter(NativeOp::Equal, key(5)));
        assert!(FilterMatcher::matches(&e, &f));

        let f = filters(StoreQuery::new("User").key_filter(NativeOp::GreaterThan, key(3)));
        assert!(FilterMatcher::matches(&e, &f));

        let f = filters(StoreQuery::new("User").key_filter(NativeOp::Equal, key(6)));
        assert!(!FilterMatcher::matches(&e, &f));
    }
}
