//! Pre-write uniqueness enforcement
//!
//! The store has no unique constraints, so before a write each unique
//! attribute is looked up with an OR of its proposed values. Any entity that
//! comes back already holds one of them.
//!
//! The check and the write are separate round-trips with no conditional write
//! in between. Concurrent writers can both pass the check.

use futures_util::future::try_join_all;
use serde_json::Value;

use super::conflict::{Conflict, ConflictList};
use super::errors::EnforcerResult;
use crate::executor::QueryExecutor;
use crate::model::{column_value, ModelMetadata, Record, UniqueAttribute};
use crate::observability::{Event, Logger, MetricsRegistry};
use crate::planner::{normalize, Criteria, QueryCompiler, WhereClause};
use crate::store::{Entity, KeyId, StoreClient};

/// Detects existing records that would collide with a write
pub struct UniquenessEnforcer<'a> {
    client: &'a dyn StoreClient,
    metrics: &'a MetricsRegistry,
    max_limit: u64,
}

impl<'a> UniquenessEnforcer<'a> {
    pub fn new(client: &'a dyn StoreClient, metrics: &'a MetricsRegistry, max_limit: u64) -> Self {
        Self {
            client,
            metrics,
            max_limit,
        }
    }

    /// Check every unique attribute of `model` against the incoming records.
    ///
    /// Attributes are checked concurrently. Absent and null values are not
    /// checked; an attribute with nothing to check issues no read. Each
    /// distinct value is read once, however many records propose it.
    pub async fn check(&self, records: &[Record], model: &ModelMetadata) -> EnforcerResult<ConflictList> {
        let checks = model
            .unique
            .iter()
            .map(|attribute| self.check_attribute(attribute, records, model));
        let per_attribute = try_join_all(checks).await?;

        let mut conflicts = ConflictList::new();
        for found in per_attribute {
            conflicts.extend(found);
        }

        if !conflicts.is_empty() {
            self.metrics.increment_unique_violations();
            Logger::warn(
                Event::UniqueViolation,
                &[
                    ("kind", model.kind.as_str()),
                    ("attributes", conflicts.attr_names().join(",").as_str()),
                    ("conflicts", conflicts.len().to_string().as_str()),
                ],
            );
        }
        Ok(conflicts)
    }

    async fn check_attribute(
        &self,
        attribute: &UniqueAttribute,
        records: &[Record],
        model: &ModelMetadata,
    ) -> EnforcerResult<Vec<Conflict>> {
        // Records sharing a value need only one branch.
        let mut values: Vec<Value> = Vec::new();
        for value in records.iter().filter_map(|record| column_value(record, &attribute.column)) {
            if !values.contains(value) {
                values.push(value.clone());
            }
        }
        if values.is_empty() {
            return Ok(Vec::new());
        }

        self.metrics.increment_unique_checks();
        Logger::info(
            Event::UniqueCheck,
            &[
                ("kind", model.kind.as_str()),
                ("attribute", attribute.name.as_str()),
                ("values", values.len().to_string().as_str()),
            ],
        );

        let clause = WhereClause::or(
            values
                .into_iter()
                .map(|value| WhereClause::eq(attribute.column.as_str(), value))
                .collect(),
        );
        let set = normalize(&clause)?;
        let criteria = Criteria::new().with_select(vec![attribute.column.clone()]);
        let queries = QueryCompiler::new(self.client, model, self.max_limit).compile_all(&set, &criteria)?;
        let existing = QueryExecutor::new(self.client, self.metrics)
            .execute(queries)
            .await?;

        Ok(existing
            .into_iter()
            .map(|entity| Conflict {
                attribute: attribute.name.clone(),
                column: attribute.column.clone(),
                value: held_value(&entity, &attribute.column, model),
                existing: entity,
            })
            .collect())
    }
}

/// The unique value an existing entity holds
fn held_value(entity: &Entity, column: &str, model: &ModelMetadata) -> Value {
    if model.is_primary_key(column) {
        entity.key.id().map(KeyId::to_value).unwrap_or(Value::Null)
    } else {
        entity.property(column).cloned().unwrap_or(Value::Null)
    }
}
