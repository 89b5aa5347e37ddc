//! Criteria planner
//!
//! Turns ORM criteria into native conjunctive store queries.
//!
//! # Pipeline
//!
//! 1. Parse: JSON criteria to [`Criteria`]
//! 2. Normalize: where-tree to [`DisjunctionSet`] (an OR of AND-groups)
//! 3. Compile: each [`FilterGroup`] to one [`CompiledQuery`]
//!
//! Primary-key predicates always compile to structural key filters. Operators
//! the store cannot express (not-in, pattern matching) are rejected, never
//! dropped.

mod ast;
mod compiler;
mod errors;
mod explain;
mod normalize;
mod parser;

pub use ast::{
    CompareOp, Criteria, FilterOp, Predicate, Select, SortDirection, SortSpec, WhereClause,
};
pub use compiler::{CompiledQuery, QueryCompiler};
pub use errors::{PlannerError, PlannerErrorCode, PlannerResult};
pub use explain::ExplainPlan;
pub use normalize::{normalize, DisjunctionSet, FilterGroup};
pub use parser::parse_where;
