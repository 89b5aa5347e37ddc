//! Result types for query execution

use serde::Serialize;

use crate::store::{Entity, Key};

/// Merged entities of one fan-out.
///
/// Pages are concatenated in issue order. Entities matching more than one
/// filter group appear once per group.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultSet {
    /// Entities in merge order
    pub entities: Vec<Entity>,
    /// Number of compiled queries run
    pub queries_issued: usize,
    /// Store round-trips, continuation batches included
    pub batches_run: usize,
    /// Missing-entity placeholders dropped from key lookups
    pub placeholders_filtered: usize,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    /// Keys of every entity, in merge order
    pub fn keys(&self) -> Vec<&Key> {
        self.entities.iter().map(Entity::key).collect()
    }

    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }
}

impl IntoIterator for ResultSet {
    type Item = Entity;
    type IntoIter = std::vec::IntoIter<Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}
