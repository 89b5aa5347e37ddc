//! Uniqueness conflicts

use serde::Serialize;
use serde_json::Value;

use super::errors::UniqueConstraintError;
use crate::store::Entity;

/// An existing entity already holding a proposed unique value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    /// Unique attribute that triggered the conflict
    pub attribute: String,
    /// Store column of that attribute
    pub column: String,
    /// The value both records share
    pub value: Value,
    /// The pre-existing entity
    pub existing: Entity,
}

/// Attribute names of `conflicts` in first-appearance order, each once
pub(crate) fn distinct_attributes<'a>(conflicts: impl IntoIterator<Item = &'a Conflict>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for conflict in conflicts {
        if !names.contains(&conflict.attribute) {
            names.push(conflict.attribute.clone());
        }
    }
    names
}

/// Conflicts aggregated across every unique attribute
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ConflictList(Vec<Conflict>);

impl ConflictList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, conflict: Conflict) {
        self.0.push(conflict);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Conflict> {
        self.0.iter()
    }

    /// Offending attribute names, first appearance first, without repeats
    pub fn attr_names(&self) -> Vec<String> {
        distinct_attributes(&self.0)
    }

    /// Keep only conflicts matching the predicate
    pub fn retain(&mut self, keep: impl FnMut(&Conflict) -> bool) {
        self.0.retain(keep);
    }

    /// `Ok` when empty, otherwise an `E_UNIQUE` error carrying every conflict
    pub fn into_result(self) -> Result<(), UniqueConstraintError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(UniqueConstraintError::new(self.0))
        }
    }

    pub fn into_vec(self) -> Vec<Conflict> {
        self.0
    }
}

impl Extend<Conflict> for ConflictList {
    fn extend<I: IntoIterator<Item = Conflict>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for ConflictList {
    type Item = Conflict;
    type IntoIter = std::vec::IntoIter<Conflict>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
