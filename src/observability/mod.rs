//! Observability subsystem
//!
//! - Structured logging (one JSON object per line)
//! - Monotonic counters
//! - Begin/complete scopes around fan-outs and drops
//!
//! Observability is read-only: nothing here can fail or alter an operation.
//!
//! # Usage
//!
//! ```ignore
//! use datastore_criteria::observability::{Event, Logger};
//!
//! Logger::info(Event::DropComplete, &[("kind", "User"), ("deleted", "1200")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{LogTarget, Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, ScopeEvents};
