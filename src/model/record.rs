//! Entity / record mapping
//!
//! A record is the ORM-facing flat column map. The primary-key column lives in
//! the store key, never in the entity's properties.

use serde_json::{Map, Value};
use thiserror::Error;

use super::metadata::ModelMetadata;
use crate::store::{Entity, KeyId, PathElement, StoreClient};

/// ORM-facing record: column name to value
pub type Record = Map<String, Value>;

/// Result type for record mapping
pub type RecordResult<T> = Result<T, RecordError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("Invalid primary key for {kind}: {value} is not an id or name")]
    InvalidPrimaryKey { kind: String, value: Value },
}

/// Value of a column, treating null as absent
pub fn column_value<'a>(record: &'a Record, column: &str) -> Option<&'a Value> {
    record.get(column).filter(|v| !v.is_null())
}

impl Entity {
    /// Record view of this entity, primary-key column first
    pub fn into_record(self, model: &ModelMetadata) -> Record {
        let mut record = Record::new();
        if let Some(id) = self.key.id() {
            record.insert(model.primary_key_column.clone(), id.to_value());
        }
        for (column, value) in self.properties {
            if column != model.primary_key_column {
                record.insert(column, value);
            }
        }
        record
    }

    /// Entity for a record. Records without a primary key get an incomplete
    /// key for the store to allocate.
    pub fn from_record(
        record: &Record,
        model: &ModelMetadata,
        client: &dyn StoreClient,
    ) -> RecordResult<Entity> {
        let mut properties = record.clone();
        let element = match properties.remove(&model.primary_key_column) {
            None | Some(Value::Null) => PathElement::incomplete(&model.kind),
            Some(value) => {
                let id = KeyId::from_value(&value).ok_or_else(|| RecordError::InvalidPrimaryKey {
                    kind: model.kind.clone(),
                    value: value.clone(),
                })?;
                PathElement::with_id(&model.kind, id)
            }
        };
        Ok(Entity::new(client.key(vec![element]), properties))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_record_round_trip_keeps_pk_in_key() {
        let store = MemoryStore::new();
        let model = ModelMetadata::new("User");

        let entity =
            Entity::from_record(&record(json!({"id": "abc", "email": "a@x"})), &model, &store)
                .unwrap();
        assert_eq!(entity.key.id(), Some(&KeyId::Name("abc".into())));
        assert!(entity.property("id").is_none());

        let back = entity.into_record(&model);
        assert_eq!(serde_json::to_string(&back).unwrap(), r#"{"id":"abc","email":"a@x"}"#);
    }

    #[test]
    fn test_missing_or_null_pk_gives_incomplete_key() {
        let store = MemoryStore::new();
        let model = ModelMetadata::new("User");

        let entity = Entity::from_record(&record(json!({"id": null})), &model, &store).unwrap();
        assert!(!entity.key.is_complete());
        assert_eq!(entity.key.kind(), "User");
    }

    #[test]
    fn test_invalid_pk_rejected() {
        let store = MemoryStore::new();
        let model = ModelMetadata::new("User");

        let err = Entity::from_record(&record(json!({"id": [1]})), &model, &store).unwrap_err();
        assert!(matches!(err, RecordError::InvalidPrimaryKey { .. }));
    }

    #[test]
    fn test_column_value_skips_null() {
        let r = record(json!({"email": null, "name": "A"}));
        assert_eq!(column_value(&r, "email"), None);
        assert_eq!(column_value(&r, "missing"), None);
        assert_eq!(column_value(&r, "name"), Some(&json!("A")));
    }
}
