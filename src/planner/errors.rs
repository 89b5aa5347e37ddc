//! Planner error types
//!
//! Error codes:
//! - E_UNSUPPORTED_OPERATOR: the where-clause uses an operator that cannot be
//!   compiled to a native conjunctive query (not-in, pattern matching)
//! - E_QUERY_INVALID: malformed criteria or an unaddressable primary key

use std::fmt;

/// Planner error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// Operator outside the native comparison set
    UnsupportedOperator,
    /// Malformed criteria structure
    QueryInvalid,
}

impl PlannerErrorCode {
    /// Returns the string code reported upward
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::UnsupportedOperator => "E_UNSUPPORTED_OPERATOR",
            PlannerErrorCode::QueryInvalid => "E_QUERY_INVALID",
        }
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerError {
    /// Error code
    code: PlannerErrorCode,
    /// Human-readable message
    message: String,
    /// Field name if applicable
    field: Option<String>,
    /// Offending operator if applicable
    operator: Option<String>,
}

impl PlannerError {
    /// Create an unsupported operator error
    pub fn unsupported_operator(field: impl Into<String>, operator: impl Into<String>) -> Self {
        let field = field.into();
        let operator = operator.into();
        Self {
            code: PlannerErrorCode::UnsupportedOperator,
            message: format!("Operator '{}' on field '{}' is not supported", operator, field),
            field: Some(field),
            operator: Some(operator),
        }
    }

    /// Create a query invalid error
    pub fn query_invalid(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::QueryInvalid,
            message: reason.into(),
            field: None,
            operator: None,
        }
    }

    /// Create a query invalid error pinned to one field
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            code: PlannerErrorCode::QueryInvalid,
            message: format!("Field '{}': {}", field, reason.into()),
            field: Some(field),
            operator: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the field name if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the offending operator if applicable
    pub fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
