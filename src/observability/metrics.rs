//! Metrics registry
//!
//! Counters only, monotonic, reset only when the registry is recreated.
//! Relaxed atomics: exact totals, no cross-counter ordering guarantees.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for one adapter context
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Native queries sent to the store
    queries_issued: AtomicU64,
    /// Entities returned to callers after merge
    entities_returned: AtomicU64,
    /// Missing-entity placeholders dropped from result sets
    placeholders_filtered: AtomicU64,
    /// Per-attribute uniqueness reads
    unique_checks: AtomicU64,
    /// Writes rejected with E_UNIQUE
    unique_violations: AtomicU64,
    /// Non-empty drop pages deleted
    drop_pages: AtomicU64,
    /// Entities deleted (drop and destroy)
    entities_deleted: AtomicU64,
    /// Store primitive failures observed
    store_failures: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_queries_issued(&self, count: u64) {
        self.queries_issued.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_entities_returned(&self, count: u64) {
        self.entities_returned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_placeholders_filtered(&self, count: u64) {
        self.placeholders_filtered.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_unique_checks(&self) {
        self.unique_checks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_unique_violations(&self) {
        self.unique_violations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_drop_pages(&self) {
        self.drop_pages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_entities_deleted(&self, count: u64) {
        self.entities_deleted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_store_failures(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all counters at once
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_issued: self.queries_issued.load(Ordering::Relaxed),
            entities_returned: self.entities_returned.load(Ordering::Relaxed),
            placeholders_filtered: self.placeholders_filtered.load(Ordering::Relaxed),
            unique_checks: self.unique_checks.load(Ordering::Relaxed),
            unique_violations: self.unique_violations.load(Ordering::Relaxed),
            drop_pages: self.drop_pages.load(Ordering::Relaxed),
            entities_deleted: self.entities_deleted.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of every counter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queries_issued: u64,
    pub entities_returned: u64,
    pub placeholders_filtered: u64,
    pub unique_checks: u64,
    pub unique_violations: u64,
    pub drop_pages: u64,
    pub entities_deleted: u64,
    pub store_failures: u64,
}
