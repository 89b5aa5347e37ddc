//! CLI command implementations
//!
//! Explain runs fully offline: keys are built against an in-memory client
//! scoped to the configured namespace, and nothing is executed.
//!
//! Stdout carries only the plan document; log lines go to stderr.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::Value;

use crate::config::AdapterConfig;
use crate::model::ModelMetadata;
use crate::observability::{LogTarget, Logger};
use crate::planner::{normalize, Criteria, ExplainPlan, PlannerResult, QueryCompiler};
use crate::store::MemoryStore;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_criteria, write_plan, OutputFormat};

/// Parse arguments and run
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    Logger::set_target(LogTarget::Stderr);
    match cmd {
        Command::Explain {
            config,
            model,
            criteria,
            format,
        } => explain(config.as_deref(), &model, criteria.as_deref(), format),
    }
}

/// Print the explain plan for one criteria object
pub fn explain(
    config_path: Option<&Path>,
    model_path: &Path,
    criteria: Option<&str>,
    format: OutputFormat,
) -> CliResult<()> {
    explain_to(
        io::stdout().lock(),
        io::stdin().lock(),
        config_path,
        model_path,
        criteria,
        format,
    )
}

/// Explain with explicit streams. `input` is read only when `criteria` is `None`.
pub fn explain_to(
    out: impl Write,
    input: impl Read,
    config_path: Option<&Path>,
    model_path: &Path,
    criteria: Option<&str>,
    format: OutputFormat,
) -> CliResult<()> {
    let config = match config_path {
        Some(path) => AdapterConfig::load(path)?,
        None => AdapterConfig::default(),
    };
    let model = load_model(model_path)?;

    let criteria = read_criteria(criteria, input)?;

    let plan = build_plan(&config, &model, &criteria);
    write_plan(out, &plan, format)
}

/// Compile criteria for `model` without executing anything
pub fn build_plan(config: &AdapterConfig, model: &ModelMetadata, criteria: &Value) -> ExplainPlan {
    let store = MemoryStore::new().with_namespace(config.namespace.clone());
    let compiled: PlannerResult<ExplainPlan> = Criteria::from_json(criteria).and_then(|criteria| {
        let set = normalize(&criteria.where_clause)?;
        let queries = QueryCompiler::new(&store, model, config.max_query_limit)
            .compile_all(&set, &criteria)?;
        Ok(ExplainPlan::from_compiled(model.kind.as_str(), &set, &queries))
    });

    compiled.unwrap_or_else(|err| ExplainPlan::from_error(model.kind.as_str(), &err))
}

fn load_model(path: &Path) -> CliResult<ModelMetadata> {
    let raw = fs::read_to_string(path).map_err(|e| CliError::model(path, e))?;
    serde_json::from_str(&raw).map_err(|e| CliError::model(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn model() -> ModelMetadata {
        ModelMetadata::new("User")
    }

    fn json_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_explain_output_is_one_document() {
        let config = json_file(r#"{"namespace": "tenant"}"#);
        let model = json_file(r#"{"kind": "User"}"#);
        let mut out = Vec::new();

        explain_to(
            &mut out,
            io::empty(),
            Some(config.path()),
            model.path(),
            Some(r#"{"where": {"or": [{"role": "admin"}, {"age": {">": 30}}]}}"#),
            OutputFormat::Json,
        )
        .unwrap();

        let document: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(document["status"], "ok");
        assert_eq!(document["plan"]["queries"][0]["namespace"], "tenant");
    }

    #[test]
    fn test_criteria_read_from_input() {
        let model = json_file(r#"{"kind": "User"}"#);
        let mut out = Vec::new();

        explain_to(
            &mut out,
            r#"{"where": {"id": 7}}"#.as_bytes(),
            None,
            model.path(),
            None,
            OutputFormat::Json,
        )
        .unwrap();

        let document: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(document["plan"]["queries"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_commands_log_to_stderr() {
        let err = run_command(Command::Explain {
            config: None,
            model: "/nonexistent/model.json".into(),
            criteria: Some("{}".into()),
            format: OutputFormat::Json,
        })
        .unwrap_err();

        assert_eq!(err.code(), "E_CLI_MODEL");
        assert_eq!(Logger::target(), LogTarget::Stderr);
    }

    #[test]
    fn test_build_plan_uses_namespace() {
        let config = AdapterConfig::default().with_namespace("tenant");
        let plan = build_plan(&config, &model(), &json!({"where": {"id": "abc"}}));

        assert!(plan.accepted);
        let value = plan.to_json();
        assert_eq!(value["queries"][0]["namespace"], "tenant");
        assert_eq!(value["queries"][0]["filters"][0]["property"], "__key__");
    }

    #[test]
    fn test_build_plan_reports_rejection() {
        let plan = build_plan(
            &AdapterConfig::default(),
            &model(),
            &json!({"where": {"name": {"nin": ["a"]}}}),
        );
        assert!(!plan.accepted);
        assert_eq!(plan.rejection_code.as_deref(), Some("E_UNSUPPORTED_OPERATOR"));
    }

    #[test]
    fn test_load_model() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"kind": "User", "unique": [{{"name": "email", "column": "email"}}]}}"#).unwrap();

        let model = load_model(file.path()).unwrap();
        assert_eq!(model.unique.len(), 1);

        let err = load_model(Path::new("/nonexistent/model.json")).unwrap_err();
        assert_eq!(err.code(), "E_CLI_MODEL");
    }
}
