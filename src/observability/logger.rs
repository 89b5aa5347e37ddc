//! Structured JSON logger
//!
//! - One log line = one event
//! - `event` first, `severity` second, remaining fields sorted by key
//! - By default WARN and below go to stdout, ERROR to stderr
//! - `LogTarget::Stderr` sends every line to stderr, for processes whose
//!   stdout carries a result document
//! - Synchronous, no buffering

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Map, Value};

use super::events::Event;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Per-query detail, compiled query dumps
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable oddities (placeholders filtered, stale cursors)
    Warn = 2,
    /// Operation failures
    Error = 3,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }

    fn uses_stderr(&self) -> bool {
        *self >= Severity::Error
    }
}

/// Where log lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTarget {
    /// Errors to stderr, everything else to stdout
    #[default]
    Split,
    /// Every line to stderr
    Stderr,
}

impl LogTarget {
    /// Returns true if a line of `severity` goes to stderr
    pub fn uses_stderr(self, severity: Severity) -> bool {
        match self {
            LogTarget::Split => severity.uses_stderr(),
            LogTarget::Stderr => true,
        }
    }
}

static ALL_TO_STDERR: AtomicBool = AtomicBool::new(false);

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured logger that emits one JSON object per line
pub struct Logger;

impl Logger {
    /// Route every following line of this process
    pub fn set_target(target: LogTarget) {
        ALL_TO_STDERR.store(target == LogTarget::Stderr, Ordering::Relaxed);
    }

    /// Current routing
    pub fn target() -> LogTarget {
        if ALL_TO_STDERR.load(Ordering::Relaxed) {
            LogTarget::Stderr
        } else {
            LogTarget::Split
        }
    }

    /// Log a typed event with the given severity and fields
    pub fn log(severity: Severity, event: Event, fields: &[(&str, &str)]) {
        let line = Self::render(severity, event.as_str(), fields);
        if Self::target().uses_stderr(severity) {
            Self::emit(&line, &mut io::stderr());
        } else {
            Self::emit(&line, &mut io::stdout());
        }
    }

    /// Builds the JSON line. Field order is deterministic.
    fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
        sorted.sort_by_key(|(k, _)| *k);

        let mut object = Map::with_capacity(fields.len() + 2);
        object.insert("event".into(), Value::String(event.to_string()));
        object.insert("severity".into(), Value::String(severity.as_str().to_string()));
        for (key, value) in sorted {
            object.insert((*key).to_string(), Value::String((*value).to_string()));
        }

        let mut line = Value::Object(object).to_string();
        line.push('\n');
        line
    }

    fn emit<W: Write>(line: &str, writer: &mut W) {
        // Logging must never fail the operation being logged.
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    /// Log at TRACE level
    pub fn trace(event: Event, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    /// Log at INFO level
    pub fn info(event: Event, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    /// Log at WARN level
    pub fn warn(event: Event, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    /// Log at ERROR level
    pub fn error(event: Event, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }
}

/// Render a log line without writing it anywhere
#[cfg(test)]
pub fn capture_log(severity: Severity, event: Event, fields: &[(&str, &str)]) -> String {
    Logger::render(severity, event.as_str(), fields)
}
