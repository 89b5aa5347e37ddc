//! Criteria AST
//!
//! The parsed, immutable form of an ORM criteria object: a where-tree of
//! AND/OR combinators over `(field, operator, value)` leaves, plus sort,
//! limit, skip and select.

use serde::Serialize;
use serde_json::Value;

/// Native comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompareOp {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }
}

/// Operation at a where-clause leaf
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// One of the native comparisons
    Compare(CompareOp, Value),
    /// Any of these values (expanded to OR of equalities)
    In(Vec<Value>),
    /// None of these values
    NotIn(Vec<Value>),
    /// Pattern match
    Like(Value),
    Contains(Value),
    StartsWith(Value),
    EndsWith(Value),
}

impl FilterOp {
    /// Returns the operation name for errors and explain output
    pub fn op_name(&self) -> &'static str {
        match self {
            FilterOp::Compare(op, _) => op.as_str(),
            FilterOp::In(_) => "in",
            FilterOp::NotIn(_) => "nin",
            FilterOp::Like(_) => "like",
            FilterOp::Contains(_) => "contains",
            FilterOp::StartsWith(_) => "startsWith",
            FilterOp::EndsWith(_) => "endsWith",
        }
    }

    /// True if normalization can express this operation natively
    pub fn is_supported(&self) -> bool {
        matches!(self, FilterOp::Compare(..) | FilterOp::In(_))
    }
}

/// A single conjunctive predicate (field + comparison + value)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predicate {
    pub field: String,
    pub op: CompareOp,
    pub value: Value,
}

impl Predicate {
    pub fn new(field: impl Into<String>, op: CompareOp, value: Value) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Create an equality predicate
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, CompareOp::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, CompareOp::Ne, value)
    }

    pub fn lt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, CompareOp::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, CompareOp::Lte, value)
    }

    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, CompareOp::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, CompareOp::Gte, value)
    }

    /// Returns true if this is an equality predicate
    pub fn is_equality(&self) -> bool {
        self.op == CompareOp::Eq
    }
}

/// Where-clause tree
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    /// All children must hold. An empty AND matches everything.
    And(Vec<WhereClause>),
    /// Any child must hold
    Or(Vec<WhereClause>),
    /// Leaf term
    Term { field: String, op: FilterOp },
}

impl WhereClause {
    /// The empty clause, matching every entity
    pub fn all() -> Self {
        WhereClause::And(Vec::new())
    }

    pub fn term(field: impl Into<String>, op: FilterOp) -> Self {
        WhereClause::Term {
            field: field.into(),
            op,
        }
    }

    /// Equality leaf
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::term(field, FilterOp::Compare(CompareOp::Eq, value))
    }

    /// Comparison leaf
    pub fn compare(field: impl Into<String>, op: CompareOp, value: Value) -> Self {
        Self::term(field, FilterOp::Compare(op, value))
    }

    pub fn and(children: Vec<WhereClause>) -> Self {
        WhereClause::And(children)
    }

    pub fn or(children: Vec<WhereClause>) -> Self {
        WhereClause::Or(children)
    }

    /// True for the match-all clause
    pub fn is_empty(&self) -> bool {
        matches!(self, WhereClause::And(children) if children.is_empty())
    }
}

impl Default for WhereClause {
    fn default() -> Self {
        Self::all()
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `ASC` in any case is ascending. Every other value is descending.
    pub fn parse(direction: &str) -> Self {
        if direction.eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Sort specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    /// Field to sort by
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Projection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Select {
    /// Every field (`*`)
    #[default]
    All,
    /// Only these fields
    Fields(Vec<String>),
}

/// Parsed criteria
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Criteria {
    pub where_clause: WhereClause,
    pub sort: Vec<SortSpec>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    pub select: Select,
}

impl Criteria {
    /// Criteria matching everything, unsorted and unbounded
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_where(mut self, clause: WhereClause) -> Self {
        self.where_clause = clause;
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_select(mut self, fields: Vec<String>) -> Self {
        self.select = Select::Fields(fields);
        self
    }
}
