//! Uniqueness error types
//!
//! Error codes:
//! - E_UNIQUE: a proposed write would duplicate a unique value already held
//!   by an existing record. Carries every conflict, not just the first.

use std::fmt;

use serde_json::{json, Value};
use thiserror::Error;

use super::conflict::{distinct_attributes, Conflict};
use crate::executor::ExecutorError;
use crate::planner::PlannerError;

/// Uniqueness violation detected before a write
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueConstraintError {
    /// Every offending attribute, first appearance first
    attr_names: Vec<String>,
    /// Every conflict found
    records: Vec<Conflict>,
}

impl UniqueConstraintError {
    pub fn new(records: Vec<Conflict>) -> Self {
        let attr_names = distinct_attributes(&records);
        Self {
            attr_names,
            records,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> &'static str {
        "E_UNIQUE"
    }

    pub fn attr_names(&self) -> &[String] {
        &self.attr_names
    }

    pub fn records(&self) -> &[Conflict] {
        &self.records
    }

    /// `{code, attrNames, records}` as reported to the ORM
    pub fn to_json(&self) -> Value {
        let records: Vec<Value> = self
            .records
            .iter()
            .map(|c| {
                json!({
                    "attribute": c.attribute,
                    "column": c.column,
                    "value": c.value,
                    "key": c.existing.key.to_string(),
                })
            })
            .collect();
        json!({
            "code": self.code(),
            "attrNames": self.attr_names,
            "records": records,
        })
    }
}

impl fmt::Display for UniqueConstraintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} existing record(s) conflict on unique attribute(s) {}",
            self.code(),
            self.records.len(),
            self.attr_names.join(", ")
        )
    }
}

impl std::error::Error for UniqueConstraintError {}

/// Result type for uniqueness checks
pub type EnforcerResult<T> = Result<T, EnforcerError>;

/// Failures while running the uniqueness reads themselves
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnforcerError {
    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

impl EnforcerError {
    pub fn code(&self) -> &'static str {
        match self {
            EnforcerError::Planner(e) => e.code().code(),
            EnforcerError::Executor(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Entity, Key, KeyId, PathElement};
    use serde_json::json;

    fn conflict(attribute: &str) -> Conflict {
        Conflict {
            attribute: attribute.into(),
            column: format!("{}_col", attribute),
            value: json!("dup"),
            existing: Entity::key_only(Key::new(
                None,
                vec![PathElement::with_id("User", KeyId::Id(4))],
            )),
        }
    }

    #[test]
    fn test_error_shape() {
        let err = UniqueConstraintError::new(vec![conflict("email"), conflict("email"), conflict("handle")]);
        assert_eq!(err.attr_names(), &["email".to_string(), "handle".to_string()]);

        let value = err.to_json();
        assert_eq!(value["code"], "E_UNIQUE");
        assert_eq!(value["attrNames"], json!(["email", "handle"]));
        assert_eq!(value["records"].as_array().unwrap().len(), 3);
        assert_eq!(value["records"][0]["key"], "User(4)");
    }

    #[test]
    fn test_display() {
        let err = UniqueConstraintError::new(vec![conflict("email")]);
        let display = err.to_string();
        assert!(display.starts_with("E_UNIQUE"));
        assert!(display.contains("email"));
    }

    #[test]
    fn test_enforcer_error_code() {
        let err: EnforcerError = PlannerError::query_invalid("bad").into();
        assert_eq!(err.code(), "E_QUERY_INVALID");
    }
}
