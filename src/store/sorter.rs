//! Ordering for the in-memory store
//!
//! Applies order clauses in sequence, then falls back to key order so that
//! results (and therefore cursors) are deterministic.

use std::cmp::Ordering;

use serde_json::Value;

use super::entity::Entity;
use super::query::{PropertyOrder, KEY_PROPERTY};

/// Sorts entities by a list of order clauses
pub(crate) struct EntitySorter;

impl EntitySorter {
    pub fn sort(entities: &mut [Entity], orders: &[PropertyOrder]) {
        entities.sort_by(|a, b| {
            for order in orders {
                let ordering = if order.property == KEY_PROPERTY {
                    a.key.cmp(&b.key)
                } else {
                    Self::compare_values(a.property(&order.property), b.property(&order.property))
                };
                let ordering = if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.key.cmp(&b.key)
        });
    }

    /// Ordering rules: missing < null < bool < number < string < array < object
    fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => {
                let rank = |v: &Value| -> u8 {
                    match v {
                        Value::Null => 0,
                        Value::Bool(_) => 1,
                        Value::Number(_) => 2,
                        Value::String(_) => 3,
                        Value::Array(_) => 4,
                        Value::Object(_) => 5,
                    }
                };

                match (a, b) {
                    (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
                    (Value::Number(x), Value::Number(y)) => {
                        let xf = x.as_f64().unwrap_or(0.0);
                        let yf = y.as_f64().unwrap_or(0.0);
                        xf.partial_cmp(&yf).unwrap_or(Ordering::Equal)
                    }
                    (Value::String(x), Value::String(y)) => x.cmp(y),
                    _ => rank(a).cmp(&rank(b)),
                }
            }
        }
    }
}
