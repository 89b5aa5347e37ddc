//! Observable events
//!
//! Every log line carries one of these. Events are explicit and typed.

use std::fmt;

/// Observable events in the criteria engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration & lifecycle
    /// Adapter configuration loaded
    ConfigLoaded,
    /// Model metadata registered with the adapter context
    ModelRegistered,
    /// Model metadata removed from the adapter context
    ModelTornDown,

    // Read path
    /// Criteria normalized and compiled into native queries
    QueryCompiled,
    /// Fan-out of compiled queries begins
    QueryFanOutBegin,
    /// All queries of a fan-out resolved
    QueryFanOutComplete,
    /// A fan-out failed (first failure wins)
    QueryFanOutFailed,
    /// A key lookup returned a placeholder for a missing entity
    PlaceholderFiltered,
    /// Store stopped a batch early; the query resumes from its cursor
    QueryContinued,

    // Write gate
    /// Uniqueness read issued for one attribute
    UniqueCheck,
    /// Pre-existing records conflict with the proposed write
    UniqueViolation,

    // Bulk drop
    /// One page of keys deleted
    DropPage,
    /// Store claimed more results but returned an empty page
    DropStaleCursor,
    /// Collection fully drained
    DropComplete,
    /// Drop aborted by a store failure
    DropFailed,

    // Adapter writes
    /// Entities saved
    EntitiesSaved,
    /// Entities updated
    EntitiesUpdated,
    /// Entities destroyed
    EntitiesDestroyed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ModelRegistered => "MODEL_REGISTERED",
            Event::ModelTornDown => "MODEL_TORN_DOWN",

            Event::QueryCompiled => "QUERY_COMPILED",
            Event::QueryFanOutBegin => "QUERY_FANOUT_BEGIN",
            Event::QueryFanOutComplete => "QUERY_FANOUT_COMPLETE",
            Event::QueryFanOutFailed => "QUERY_FANOUT_FAILED",
            Event::PlaceholderFiltered => "PLACEHOLDER_FILTERED",
            Event::QueryContinued => "QUERY_CONTINUED",

            Event::UniqueCheck => "UNIQUE_CHECK",
            Event::UniqueViolation => "UNIQUE_VIOLATION",

            Event::DropPage => "DROP_PAGE",
            Event::DropStaleCursor => "DROP_STALE_CURSOR",
            Event::DropComplete => "DROP_COMPLETE",
            Event::DropFailed => "DROP_FAILED",

            Event::EntitiesSaved => "ENTITIES_SAVED",
            Event::EntitiesUpdated => "ENTITIES_UPDATED",
            Event::EntitiesDestroyed => "ENTITIES_DESTROYED",
        }
    }

    /// Returns true if this event reports a failed operation
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::QueryFanOutFailed | Event::DropFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
