//! Criteria input and plan output
//!
//! Criteria arrive as one JSON document, either inline or on stdin. Plans
//! leave as a JSON object or as the human-readable explain text.

use std::io::{Read, Write};

use clap::ValueEnum;
use serde_json::{json, Value};

use super::errors::{CliError, CliResult};
use crate::planner::ExplainPlan;

/// How a plan is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

/// Parse criteria from `inline`, falling back to the whole of `reader`
pub fn read_criteria(inline: Option<&str>, mut reader: impl Read) -> CliResult<Value> {
    let raw = match inline {
        Some(raw) => raw.to_string(),
        None => {
            let mut buf = String::new();
            reader.read_to_string(&mut buf)?;
            buf
        }
    };

    if raw.trim().is_empty() {
        return Err(CliError::Input("no criteria given".into()));
    }
    serde_json::from_str(&raw).map_err(|e| CliError::Input(format!("criteria is not JSON: {}", e)))
}

/// Print `plan` in the requested format, one document per call
pub fn write_plan(mut out: impl Write, plan: &ExplainPlan, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let status = if plan.accepted { "ok" } else { "rejected" };
            let body = json!({ "status": status, "plan": plan.to_json() });
            writeln!(out, "{}", body)?;
        }
        OutputFormat::Text => write!(out, "{}", plan)?,
    }
    out.flush()?;
    Ok(())
}
