//! datastore-criteria - criteria compiler and multi-query engine for an
//! AND-only key/value document store
//!
//! - `planner`: criteria parsing, DNF normalization, query compilation
//! - `executor`: concurrent fan-out and result merging
//! - `unique`: pre-write uniqueness enforcement
//! - `bulk`: cursor-paged recursive deletion
//! - `adapter`: the ORM-facing boundary and its context
//! - `store`: the store client capability and an in-memory client

pub mod adapter;
pub mod bulk;
pub mod cli;
pub mod config;
pub mod executor;
pub mod model;
pub mod observability;
pub mod planner;
pub mod store;
pub mod unique;
