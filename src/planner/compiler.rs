//! Query compiler
//!
//! Turns one filter group plus the criteria's sort/limit/skip/select into one
//! native store query. Predicates on the primary-key column become structural
//! key filters; everything else is a property filter with the same operator.

use serde::Serialize;

use super::ast::{CompareOp, Criteria, Predicate, Select, SortDirection};
use super::errors::{PlannerError, PlannerResult};
use super::normalize::{DisjunctionSet, FilterGroup};
use crate::config::STORE_MAX_LIMIT;
use crate::model::ModelMetadata;
use crate::store::{Key, KeyId, NativeOp, PathElement, StoreClient, StoreQuery, KEY_PROPERTY};

/// A native query ready for execution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CompiledQuery {
    query: StoreQuery,
}

impl CompiledQuery {
    pub fn new(query: StoreQuery) -> Self {
        Self { query }
    }

    pub fn query(&self) -> &StoreQuery {
        &self.query
    }

    pub fn into_query(self) -> StoreQuery {
        self.query
    }

    /// The addressed key if this is a key-equality lookup
    pub fn key_lookup(&self) -> Option<&Key> {
        self.query.key_lookup()
    }
}

/// Compiles filter groups for one model
pub struct QueryCompiler<'a> {
    client: &'a dyn StoreClient,
    model: &'a ModelMetadata,
    max_limit: u64,
}

impl<'a> QueryCompiler<'a> {
    /// `max_limit` above the store maximum is lowered to it.
    pub fn new(client: &'a dyn StoreClient, model: &'a ModelMetadata, max_limit: u64) -> Self {
        Self {
            client,
            model,
            max_limit: max_limit.min(STORE_MAX_LIMIT),
        }
    }

    /// Compile one filter group
    pub fn compile(&self, group: &FilterGroup, criteria: &Criteria) -> PlannerResult<CompiledQuery> {
        let pk_column = self.model.primary_key_column.as_str();
        let mut query = self.client.create_query(&self.model.kind);

        for predicate in group.iter() {
            let op = native_op(predicate.op);
            query = if predicate.field == pk_column {
                query.key_filter(op, self.key_for(predicate)?)
            } else {
                query.filter(predicate.field.as_str(), op, predicate.value.clone())
            };
        }

        for spec in &criteria.sort {
            let property = if spec.field == pk_column {
                KEY_PROPERTY
            } else {
                spec.field.as_str()
            };
            query = query.order(property, spec.direction == SortDirection::Desc);
        }

        if let Some(limit) = criteria.limit.filter(|l| *l > 0) {
            query = query.limit(limit.min(self.max_limit));
        }
        if let Some(skip) = criteria.skip.filter(|s| *s > 0) {
            query = query.offset(skip);
        }

        if let Select::Fields(fields) = &criteria.select {
            // The primary key always comes back through the entity key.
            let mut projection: Vec<String> = Vec::with_capacity(fields.len());
            for field in fields {
                if field != pk_column && !projection.contains(field) {
                    projection.push(field.clone());
                }
            }
            query = if projection.is_empty() {
                query.keys_only()
            } else {
                query.select(projection)
            };
        }

        Ok(CompiledQuery::new(query))
    }

    /// Compile every group of a disjunction set, in order
    pub fn compile_all(
        &self,
        set: &DisjunctionSet,
        criteria: &Criteria,
    ) -> PlannerResult<Vec<CompiledQuery>> {
        set.iter().map(|group| self.compile(group, criteria)).collect()
    }

    fn key_for(&self, predicate: &Predicate) -> PlannerResult<Key> {
        let id = KeyId::from_value(&predicate.value).ok_or_else(|| {
            PlannerError::invalid_field(
                predicate.field.as_str(),
                format!("primary key value {} is not an id or name", predicate.value),
            )
        })?;
        Ok(self
            .client
            .key(vec![PathElement::with_id(self.model.kind.as_str(), id)]))
    }
}

fn native_op(op: CompareOp) -> NativeOp {
    match op {
        CompareOp::Eq => NativeOp::Equal,
        CompareOp::Ne => NativeOp::NotEqual,
        CompareOp::Lt => NativeOp::LessThan,
        CompareOp::Lte => NativeOp::LessThanOrEqual,
        CompareOp::Gt => NativeOp::GreaterThan,
        CompareOp::Gte => NativeOp::GreaterThanOrEqual,
    }
}
