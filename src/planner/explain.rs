//! Explain plan output
//!
//! Shows how criteria expand into filter groups and which native query each
//! group compiles to. Deterministic for the same inputs.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::compiler::CompiledQuery;
use super::errors::PlannerError;
use super::normalize::{DisjunctionSet, FilterGroup};
use crate::store::{FilterValue, StoreQuery};

/// Explain plan output
#[derive(Debug, Clone, Serialize)]
pub struct ExplainPlan {
    /// Target kind
    pub kind: String,
    /// Whether compilation succeeded
    pub accepted: bool,
    /// Normalized filter groups
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<FilterGroup>,
    /// One native query per group
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub queries: Vec<CompiledQuery>,
    /// Rejection error code (if rejected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_code: Option<String>,
    /// Rejection reason (if rejected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from compiled queries
    pub fn from_compiled(
        kind: impl Into<String>,
        set: &DisjunctionSet,
        queries: &[CompiledQuery],
    ) -> Self {
        Self {
            kind: kind.into(),
            accepted: true,
            groups: set.groups().to_vec(),
            queries: queries.to_vec(),
            rejection_code: None,
            rejection_reason: None,
        }
    }

    /// Creates an explain plan from a planning error
    pub fn from_error(kind: impl Into<String>, err: &PlannerError) -> Self {
        Self {
            kind: kind.into(),
            accepted: false,
            groups: Vec::new(),
            queries: Vec::new(),
            rejection_code: Some(err.code().code().to_string()),
            rejection_reason: Some(err.message().to_string()),
        }
    }

    /// Number of queries that address a single key
    pub fn key_lookups(&self) -> usize {
        self.queries.iter().filter(|q| q.key_lookup().is_some()).count()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// One-line description of a native query
fn describe(query: &StoreQuery) -> String {
    let mut out = format!("SELECT {}", query.kind);

    if query.keys_only {
        out.push_str(" KEYS ONLY");
    } else if !query.projection.is_empty() {
        out.push_str(&format!(" ({})", query.projection.join(", ")));
    }

    if !query.filters.is_empty() {
        let filters: Vec<String> = query
            .filters
            .iter()
            .map(|f| match &f.value {
                FilterValue::Value(v) => format!("{} {} {}", f.property, f.op, v),
                FilterValue::Key(k) => format!("{} {} KEY({})", f.property, f.op, k),
            })
            .collect();
        out.push_str(&format!(" WHERE {}", filters.join(" AND ")));
    }

    if !query.orders.is_empty() {
        let orders: Vec<String> = query
            .orders
            .iter()
            .map(|o| format!("{} {}", o.property, if o.descending { "DESC" } else { "ASC" }))
            .collect();
        out.push_str(&format!(" ORDER BY {}", orders.join(", ")));
    }

    if let Some(limit) = query.limit {
        out.push_str(&format!(" LIMIT {}", limit));
    }
    if let Some(offset) = query.offset {
        out.push_str(&format!(" OFFSET {}", offset));
    }
    out
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;
        writeln!(f, "Kind: {}", self.kind)?;

        if self.accepted {
            writeln!(f, "Status: ACCEPTED")?;
            writeln!(
                f,
                "Queries: {} ({} key lookups)",
                self.queries.len(),
                self.key_lookups()
            )?;
            for (i, query) in self.queries.iter().enumerate() {
                writeln!(f, "  [{}] {}", i, describe(query.query()))?;
            }
        } else {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelMetadata;
    use crate::planner::ast::{Criteria, SortSpec, WhereClause};
    use crate::planner::compiler::QueryCompiler;
    use crate::planner::normalize::normalize;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn plan(criteria: &Criteria) -> ExplainPlan {
        let store = MemoryStore::new();
        let model = ModelMetadata::new("User");
        let set = normalize(&criteria.where_clause).unwrap();
        let queries = QueryCompiler::new(&store, &model, 1000)
            .compile_all(&set, criteria)
            .unwrap();
        ExplainPlan::from_compiled("User", &set, &queries)
    }

    #[test]
    fn test_explain_accepted_plan() {
        let criteria = Criteria::new()
            .with_where(WhereClause::or(vec![
                WhereClause::eq("id", json!(7)),
                WhereClause::eq("email", json!("a@x")),
            ]))
            .with_sort(SortSpec::desc("age"))
            .with_limit(5000);
        let explain = plan(&criteria);

        assert!(explain.accepted);
        assert_eq!(explain.queries.len(), 2);
        assert_eq!(explain.key_lookups(), 1);

        let output = format!("{}", explain);
        assert!(output.contains("ACCEPTED"));
        assert!(output.contains("__key__ = KEY(User(7))"));
        assert!(output.contains("email = \"a@x\" ORDER BY age DESC LIMIT 1000"));
    }

    #[test]
    fn test_explain_json_shape() {
        let explain = plan(&Criteria::new().with_where(WhereClause::eq("age", json!(3))));
        let value = explain.to_json();

        assert_eq!(value["kind"], "User");
        assert_eq!(value["groups"][0][0]["op"], "=");
        assert_eq!(value["queries"][0]["filters"][0]["op"], "=");
        assert!(value.get("rejection_code").is_none());
    }

    #[test]
    fn test_explain_rejected_plan() {
        let err = PlannerError::unsupported_operator("name", "like");
        let explain = ExplainPlan::from_error("User", &err);

        assert!(!explain.accepted);
        assert_eq!(explain.rejection_code, Some("E_UNSUPPORTED_OPERATOR".into()));

        let output = format!("{}", explain);
        assert!(output.contains("REJECTED"));
        assert!(output.contains("E_UNSUPPORTED_OPERATOR"));
    }

    #[test]
    fn test_explain_deterministic() {
        let criteria = Criteria::new().with_where(WhereClause::eq("email", json!("a@x")));
        assert_eq!(format!("{}", plan(&criteria)), format!("{}", plan(&criteria)));
    }
}
