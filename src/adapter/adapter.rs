//! Datastore adapter
//!
//! The boundary the ORM calls into. Reads go through normalize, compile and
//! execute; writes pass the uniqueness gate first; drops page through the
//! recursive deleter.

use std::collections::HashSet;
use std::sync::Arc;

use super::context::AdapterContext;
use super::errors::{AdapterError, AdapterResult};
use crate::bulk::{DropSummary, RecursiveDeleter};
use crate::config::AdapterConfig;
use crate::executor::{QueryExecutor, ResultSet};
use crate::model::{column_value, ModelMetadata, Record};
use crate::observability::{Event, Logger};
use crate::planner::{normalize, Criteria, PlannerError, QueryCompiler, Select};
use crate::store::{Entity, Key, StoreClient, StoreError};
use crate::unique::{ConflictList, UniquenessEnforcer};

/// ORM-facing adapter over one store client
pub struct DatastoreAdapter {
    ctx: AdapterContext,
}

impl DatastoreAdapter {
    pub fn new(client: Arc<dyn StoreClient>, config: AdapterConfig) -> Self {
        Self {
            ctx: AdapterContext::new(client, config),
        }
    }

    pub fn context(&self) -> &AdapterContext {
        &self.ctx
    }

    pub fn register(&mut self, model: ModelMetadata) -> AdapterResult<()> {
        Ok(self.ctx.register(model)?)
    }

    pub fn teardown(&mut self, kind: &str) -> AdapterResult<ModelMetadata> {
        Ok(self.ctx.teardown(kind)?)
    }

    pub fn teardown_all(&mut self) {
        self.ctx.teardown_all();
    }

    // ==================================================================
    // Core contracts
    // ==================================================================

    /// Read path: normalize, compile one query per group, fan out
    pub async fn compile_and_execute(
        &self,
        criteria: &Criteria,
        model: &ModelMetadata,
    ) -> AdapterResult<ResultSet> {
        let client = self.ctx.client();
        let set = normalize(&criteria.where_clause)?;
        let queries = QueryCompiler::new(client, model, self.ctx.config().max_query_limit)
            .compile_all(&set, criteria)?;

        if self.ctx.config().log_queries {
            for query in &queries {
                let rendered = serde_json::to_string(query.query()).unwrap_or_default();
                Logger::trace(
                    Event::QueryCompiled,
                    &[("kind", model.kind.as_str()), ("query", rendered.as_str())],
                );
            }
        }

        Ok(QueryExecutor::new(client, self.ctx.metrics())
            .execute(queries)
            .await?)
    }

    /// Pre-write gate: conflicts between `records` and existing entities
    pub async fn enforce_uniqueness(
        &self,
        records: &[Record],
        model: &ModelMetadata,
    ) -> AdapterResult<ConflictList> {
        let enforcer = UniquenessEnforcer::new(
            self.ctx.client(),
            self.ctx.metrics(),
            self.ctx.config().max_query_limit,
        );
        Ok(enforcer.check(records, model).await?)
    }

    /// Delete every entity of `kind`
    pub async fn drop_all(&self, kind: &str) -> AdapterResult<DropSummary> {
        let deleter = RecursiveDeleter::new(
            self.ctx.client(),
            self.ctx.config().drop_page_size,
            self.ctx.metrics(),
        );
        Ok(deleter.drop_all(kind).await?)
    }

    // ==================================================================
    // ORM operations
    // ==================================================================

    /// Matching records. Records matching several OR branches repeat.
    pub async fn find(&self, kind: &str, criteria: &Criteria) -> AdapterResult<Vec<Record>> {
        let model = self.ctx.registry().get(kind)?;
        let result = self.compile_and_execute(criteria, model).await?;
        Ok(result
            .into_iter()
            .map(|entity| entity.into_record(model))
            .collect())
    }

    /// Size of the merged result set, fetched keys-only
    pub async fn count(&self, kind: &str, criteria: &Criteria) -> AdapterResult<usize> {
        let model = self.ctx.registry().get(kind)?;
        let keys_only = criteria
            .clone()
            .with_select(vec![model.primary_key_column.clone()]);
        Ok(self.compile_and_execute(&keys_only, model).await?.len())
    }

    /// Insert records after the uniqueness gate. Returns them with their keys.
    pub async fn create(&self, kind: &str, records: Vec<Record>) -> AdapterResult<Vec<Record>> {
        let model = self.ctx.registry().get(kind)?;
        self.enforce_uniqueness(&records, model)
            .await?
            .into_result()?;

        let client = self.ctx.client();
        let entities = records
            .iter()
            .map(|record| Entity::from_record(record, model, client))
            .collect::<Result<Vec<_>, _>>()?;
        let properties: Vec<_> = entities.iter().map(|e| e.properties.clone()).collect();

        let keys = client
            .save(entities)
            .await
            .map_err(|e| self.store_failure(e))?;

        Logger::info(
            Event::EntitiesSaved,
            &[("kind", kind), ("count", keys.len().to_string().as_str())],
        );
        Ok(keys
            .into_iter()
            .zip(properties)
            .map(|(key, props)| Entity::new(key, props).into_record(model))
            .collect())
    }

    /// Apply `values` to every matching record. The primary key cannot change.
    pub async fn update(
        &self,
        kind: &str,
        criteria: &Criteria,
        values: Record,
    ) -> AdapterResult<Vec<Record>> {
        let model = self.ctx.registry().get(kind)?;
        if values.contains_key(&model.primary_key_column) {
            return Err(PlannerError::invalid_field(
                model.primary_key_column.as_str(),
                format!("primary key '{}' cannot be updated", model.primary_key),
            )
            .into());
        }

        let matched = self.matching_entities(criteria, model).await?;
        if matched.is_empty() {
            return Ok(Vec::new());
        }

        // A record may keep its own unique values.
        let touched: HashSet<&Key> = matched.iter().map(Entity::key).collect();
        let unique_values: Record = model
            .unique
            .iter()
            .filter_map(|attr| {
                column_value(&values, &attr.column).map(|v| (attr.column.clone(), v.clone()))
            })
            .collect();
        let mut conflicts = self
            .enforce_uniqueness(std::slice::from_ref(&unique_values), model)
            .await?;
        conflicts.retain(|c| !touched.contains(&c.existing.key));
        conflicts.into_result()?;

        let updated: Vec<Entity> = matched
            .iter()
            .map(|entity| {
                let mut properties = entity.properties.clone();
                for (column, value) in &values {
                    properties.insert(column.clone(), value.clone());
                }
                Entity::new(entity.key.clone(), properties)
            })
            .collect();

        self.ctx
            .client()
            .update(updated.clone())
            .await
            .map_err(|e| self.store_failure(e))?;

        Logger::info(
            Event::EntitiesUpdated,
            &[("kind", kind), ("count", updated.len().to_string().as_str())],
        );
        Ok(updated
            .into_iter()
            .map(|entity| entity.into_record(model))
            .collect())
    }

    /// Delete every matching record. Returns what was deleted.
    pub async fn destroy(&self, kind: &str, criteria: &Criteria) -> AdapterResult<Vec<Record>> {
        let model = self.ctx.registry().get(kind)?;
        let matched = self.matching_entities(criteria, model).await?;
        if matched.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<Key> = matched.iter().map(|e| e.key.clone()).collect();
        self.ctx
            .client()
            .delete(keys)
            .await
            .map_err(|e| self.store_failure(e))?;

        Logger::info(
            Event::EntitiesDestroyed,
            &[("kind", kind), ("count", matched.len().to_string().as_str())],
        );
        Ok(matched
            .into_iter()
            .map(|entity| entity.into_record(model))
            .collect())
    }

    /// Full entities matching `criteria`, each key once. Writes must not see
    /// a projection or the OR-branch repeats.
    async fn matching_entities(
        &self,
        criteria: &Criteria,
        model: &ModelMetadata,
    ) -> AdapterResult<Vec<Entity>> {
        let full = Criteria {
            select: Select::All,
            ..criteria.clone()
        };
        let result = self.compile_and_execute(&full, model).await?;

        let mut seen: HashSet<Key> = HashSet::new();
        Ok(result
            .into_iter()
            .filter(|entity| seen.insert(entity.key.clone()))
            .collect())
    }

    fn store_failure(&self, err: StoreError) -> AdapterError {
        self.ctx.metrics().increment_store_failures();
        AdapterError::Store(err)
    }
}
