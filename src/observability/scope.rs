//! ObservationScope for begin/complete logging around one operation
//!
//! - Logs the begin event (if any) on creation
//! - Logs the complete event with `elapsed_ms` on `complete()`
//! - Logs the failed event on `fail()`, or on drop if the scope was abandoned
//!   (a cancelled future drops its scope mid-flight)

use std::time::Instant;

use uuid::Uuid;

use super::events::Event;
use super::logger::{Logger, Severity};

/// Begin / complete / failed events describing one kind of operation
#[derive(Debug, Clone, Copy)]
pub struct ScopeEvents {
    pub begin: Option<Event>,
    pub complete: Event,
    pub failed: Event,
}

/// A scope that logs the outcome of one operation exactly once
pub struct ObservationScope {
    events: ScopeEvents,
    op_id: String,
    fields: Vec<(String, String)>,
    started_at: Instant,
    finished: bool,
}

impl ObservationScope {
    /// Open a scope. Every line it logs carries `op_id` plus `fields`.
    pub fn begin(events: ScopeEvents, fields: &[(&str, &str)]) -> Self {
        let scope = Self {
            events,
            op_id: Uuid::new_v4().to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            started_at: Instant::now(),
            finished: false,
        };

        if let Some(begin) = events.begin {
            scope.emit(Severity::Info, begin, &[]);
        }
        scope
    }

    /// Identifier shared by every line of this scope
    pub fn op_id(&self) -> &str {
        &self.op_id
    }

    /// Mark the operation successful
    pub fn complete(mut self, extra: &[(&str, &str)]) {
        self.finished = true;
        let elapsed = self.started_at.elapsed().as_millis().to_string();
        let mut fields: Vec<(&str, &str)> = extra.to_vec();
        fields.push(("elapsed_ms", elapsed.as_str()));
        self.emit(Severity::Info, self.events.complete, &fields);
    }

    /// Mark the operation failed
    pub fn fail(mut self, reason: &str) {
        self.finished = true;
        self.emit(Severity::Error, self.events.failed, &[("reason", reason)]);
    }

    fn emit(&self, severity: Severity, event: Event, extra: &[(&str, &str)]) {
        let mut fields: Vec<(&str, &str)> = self
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        fields.push(("op_id", self.op_id.as_str()));
        fields.extend(extra.iter().copied());
        Logger::log(severity, event, &fields);
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.finished {
            self.emit(
                Severity::Warn,
                self.events.failed,
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}
