//! Disjunctive normal form
//!
//! The store only runs conjunctive queries, so a where-tree is flattened into
//! an OR of AND-groups before compilation:
//!
//! - OR concatenates the groups of its branches
//! - AND takes the cross-product of its children's groups
//! - a leaf is one single-predicate group; `in` is one group per value
//!
//! The transform is pure and never yields an empty set.

use serde::Serialize;

use super::ast::{FilterOp, Predicate, WhereClause};
use super::errors::{PlannerError, PlannerResult};

/// One AND-group of predicates
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct FilterGroup(Vec<Predicate>);

impl FilterGroup {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self(predicates)
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Predicate> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// An empty group matches everything
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn concat(&self, other: &FilterGroup) -> FilterGroup {
        let mut predicates = Vec::with_capacity(self.len() + other.len());
        predicates.extend_from_slice(&self.0);
        predicates.extend_from_slice(&other.0);
        FilterGroup(predicates)
    }
}

/// OR of AND-groups. Always holds at least one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DisjunctionSet(Vec<FilterGroup>);

impl DisjunctionSet {
    /// One empty group
    pub fn match_all() -> Self {
        Self(vec![FilterGroup::default()])
    }

    pub fn groups(&self) -> &[FilterGroup] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterGroup> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_groups(self) -> Vec<FilterGroup> {
        self.0
    }
}

impl<'a> IntoIterator for &'a DisjunctionSet {
    type Item = &'a FilterGroup;
    type IntoIter = std::slice::Iter<'a, FilterGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Expand a where-clause into disjunctive normal form
pub fn normalize(clause: &WhereClause) -> PlannerResult<DisjunctionSet> {
    let groups = expand(clause)?;
    if groups.is_empty() {
        return Ok(DisjunctionSet::match_all());
    }
    Ok(DisjunctionSet(groups))
}

fn expand(clause: &WhereClause) -> PlannerResult<Vec<FilterGroup>> {
    match clause {
        WhereClause::Term { field, op } => expand_leaf(field, op),
        WhereClause::Or(branches) => {
            if branches.is_empty() {
                return Err(PlannerError::query_invalid("or requires at least one branch"));
            }
            let mut groups = Vec::new();
            for branch in branches {
                groups.extend(expand(branch)?);
            }
            Ok(groups)
        }
        WhereClause::And(children) => {
            let mut product = vec![FilterGroup::default()];
            for child in children {
                let branch = expand(child)?;
                product = product
                    .iter()
                    .flat_map(|left| branch.iter().map(move |right| left.concat(right)))
                    .collect();
            }
            Ok(product)
        }
    }
}

fn expand_leaf(field: &str, op: &FilterOp) -> PlannerResult<Vec<FilterGroup>> {
    match op {
        FilterOp::Compare(cmp, value) => Ok(vec![FilterGroup(vec![Predicate::new(
            field,
            *cmp,
            value.clone(),
        )])]),
        FilterOp::In(values) => {
            if values.is_empty() {
                return Err(PlannerError::invalid_field(field, "'in' requires at least one value"));
            }
            Ok(values
                .iter()
                .map(|v| FilterGroup(vec![Predicate::eq(field, v.clone())]))
                .collect())
        }
        unsupported => Err(PlannerError::unsupported_operator(field, unsupported.op_name())),
    }
}
