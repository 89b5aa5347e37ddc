//! Per-collection model metadata
//!
//! Supplied by the surrounding ORM layer and read-only to the engine. Field
//! names in criteria and records are store columns.

use serde::{Deserialize, Serialize};

fn default_primary_key() -> String {
    "id".to_string()
}

/// An attribute flagged unique, with the store column it maps to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueAttribute {
    pub name: String,
    pub column: String,
}

/// Model metadata for one collection (store kind)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Store kind the collection lives in
    pub kind: String,

    /// Primary-key attribute name as the ORM knows it. Only used in error
    /// text; queries and keys go through `primary_key_column`.
    #[serde(default = "default_primary_key")]
    pub primary_key: String,

    /// Store column the primary key maps to
    #[serde(default = "default_primary_key")]
    pub primary_key_column: String,

    /// Attributes whose values must be distinct across the collection
    #[serde(default)]
    pub unique: Vec<UniqueAttribute>,
}

impl ModelMetadata {
    /// Model whose primary key is `id`, stored as `id`
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            primary_key: default_primary_key(),
            primary_key_column: default_primary_key(),
            unique: Vec::new(),
        }
    }

    pub fn with_primary_key(mut self, name: impl Into<String>, column: impl Into<String>) -> Self {
        self.primary_key = name.into();
        self.primary_key_column = column.into();
        self
    }

    pub fn with_unique(mut self, name: impl Into<String>, column: impl Into<String>) -> Self {
        self.unique.push(UniqueAttribute {
            name: name.into(),
            column: column.into(),
        });
        self
    }

    /// True if `column` is the primary-key column
    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_key_column == column
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_with_defaults() {
        let model: ModelMetadata = serde_json::from_value(json!({"kind": "User"})).unwrap();
        assert_eq!(model, ModelMetadata::new("User"));
        assert!(model.is_primary_key("id"));
    }

    #[test]
    fn test_deserialize_full() {
        let model: ModelMetadata = serde_json::from_value(json!({
            "kind": "User",
            "primary_key": "uid",
            "primary_key_column": "user_id",
            "unique": [{"name": "email", "column": "email_address"}]
        }))
        .unwrap();

        assert!(model.is_primary_key("user_id"));
        assert!(!model.is_primary_key("uid"));
        assert_eq!(model.unique[0].column, "email_address");
    }
}
