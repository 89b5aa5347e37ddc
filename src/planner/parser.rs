//! Criteria parsing
//!
//! Accepts the ORM's JSON criteria shape:
//!
//! ```text
//! {
//!   "where":  {"or": [{"name": "a"}, {"age": {">": 30, "<=": 60}}], "tag": ["x", "y"]},
//!   "sort":   [{"age": "DESC"}] | {"age": "DESC"} | "age DESC, name ASC",
//!   "limit":  10,
//!   "skip":   20,
//!   "select": ["name", "age"] | ["*"]
//! }
//! ```
//!
//! Several keys in one where-object are AND-ed. A scalar is equality, an
//! array is `in`, an object maps operators to operands.

use serde_json::{Map, Value};

use super::ast::{CompareOp, Criteria, FilterOp, Select, SortDirection, SortSpec, WhereClause};
use super::errors::{PlannerError, PlannerResult};

impl Criteria {
    /// Parse a criteria object
    pub fn from_json(value: &Value) -> PlannerResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| PlannerError::query_invalid("criteria must be a JSON object"))?;

        let mut criteria = Criteria::new();
        for (key, value) in object {
            match key.as_str() {
                "where" => criteria.where_clause = parse_where(value)?,
                "sort" => criteria.sort = parse_sort(value)?,
                "limit" => criteria.limit = parse_count("limit", value)?,
                "skip" => criteria.skip = parse_count("skip", value)?,
                "select" => criteria.select = parse_select(value)?,
                other => {
                    return Err(PlannerError::query_invalid(format!(
                        "unknown criteria key '{}'",
                        other
                    )))
                }
            }
        }
        Ok(criteria)
    }
}

/// Parse a where-clause. `null` and `{}` match everything.
pub fn parse_where(value: &Value) -> PlannerResult<WhereClause> {
    match value {
        Value::Null => Ok(WhereClause::all()),
        Value::Object(object) => parse_where_object(object),
        _ => Err(PlannerError::query_invalid("where must be an object")),
    }
}

fn parse_where_object(object: &Map<String, Value>) -> PlannerResult<WhereClause> {
    let mut terms = Vec::with_capacity(object.len());
    for (key, value) in object {
        let term = match key.as_str() {
            "and" => WhereClause::And(parse_branches("and", value)?),
            "or" => {
                let branches = parse_branches("or", value)?;
                if branches.is_empty() {
                    return Err(PlannerError::query_invalid("or requires at least one branch"));
                }
                WhereClause::Or(branches)
            }
            field => parse_field(field, value)?,
        };
        terms.push(term);
    }

    if terms.len() == 1 {
        Ok(terms.remove(0))
    } else {
        Ok(WhereClause::And(terms))
    }
}

fn parse_branches(combinator: &str, value: &Value) -> PlannerResult<Vec<WhereClause>> {
    let items = value
        .as_array()
        .ok_or_else(|| PlannerError::query_invalid(format!("{} must be an array", combinator)))?;
    items.iter().map(parse_where).collect()
}

fn parse_field(field: &str, value: &Value) -> PlannerResult<WhereClause> {
    match value {
        Value::Array(values) => {
            let values = non_empty(field, "in", values)?;
            Ok(WhereClause::term(field, FilterOp::In(values)))
        }
        Value::Object(modifiers) => {
            if modifiers.is_empty() {
                return Err(PlannerError::invalid_field(field, "empty operator object"));
            }
            let mut terms = modifiers
                .iter()
                .map(|(op, operand)| {
                    parse_operator(field, op, operand).map(|op| WhereClause::term(field, op))
                })
                .collect::<PlannerResult<Vec<_>>>()?;
            if terms.len() == 1 {
                Ok(terms.remove(0))
            } else {
                Ok(WhereClause::And(terms))
            }
        }
        scalar => Ok(WhereClause::eq(field, scalar.clone())),
    }
}

fn parse_operator(field: &str, op: &str, operand: &Value) -> PlannerResult<FilterOp> {
    let compare = |cmp: CompareOp| -> PlannerResult<FilterOp> {
        Ok(FilterOp::Compare(cmp, operand.clone()))
    };
    match op {
        "=" | "eq" => compare(CompareOp::Eq),
        "!=" | "ne" | "not" => compare(CompareOp::Ne),
        "<" | "lt" => compare(CompareOp::Lt),
        "<=" | "lte" => compare(CompareOp::Lte),
        ">" | "gt" => compare(CompareOp::Gt),
        ">=" | "gte" => compare(CompareOp::Gte),
        "in" => Ok(FilterOp::In(list_operand(field, op, operand)?)),
        "nin" => Ok(FilterOp::NotIn(list_operand(field, op, operand)?)),
        "like" => Ok(FilterOp::Like(operand.clone())),
        "contains" => Ok(FilterOp::Contains(operand.clone())),
        "startsWith" => Ok(FilterOp::StartsWith(operand.clone())),
        "endsWith" => Ok(FilterOp::EndsWith(operand.clone())),
        unknown => Err(PlannerError::unsupported_operator(field, unknown)),
    }
}

fn list_operand(field: &str, op: &str, operand: &Value) -> PlannerResult<Vec<Value>> {
    match operand {
        Value::Array(values) => non_empty(field, op, values),
        _ => Err(PlannerError::invalid_field(field, format!("'{}' requires an array", op))),
    }
}

fn non_empty(field: &str, op: &str, values: &[Value]) -> PlannerResult<Vec<Value>> {
    if values.is_empty() {
        return Err(PlannerError::invalid_field(
            field,
            format!("'{}' requires at least one value", op),
        ));
    }
    Ok(values.to_vec())
}

fn parse_sort(value: &Value) -> PlannerResult<Vec<SortSpec>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => parse_sort_string(s),
        Value::Object(object) => parse_sort_object(object),
        Value::Array(items) => {
            let mut specs = Vec::new();
            for item in items {
                match item {
                    Value::String(s) => specs.extend(parse_sort_string(s)?),
                    Value::Object(object) => specs.extend(parse_sort_object(object)?),
                    _ => {
                        return Err(PlannerError::query_invalid(
                            "sort entries must be strings or objects",
                        ))
                    }
                }
            }
            Ok(specs)
        }
        _ => Err(PlannerError::query_invalid("sort must be a string, object or array")),
    }
}

/// `"age DESC, name"`; a missing direction is ascending
fn parse_sort_string(s: &str) -> PlannerResult<Vec<SortSpec>> {
    s.split(',')
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
        .map(|clause| {
            let mut parts = clause.split_whitespace();
            let field = parts
                .next()
                .ok_or_else(|| PlannerError::query_invalid("empty sort clause"))?;
            let direction = parts.next().map(SortDirection::parse).unwrap_or(SortDirection::Asc);
            if parts.next().is_some() {
                return Err(PlannerError::query_invalid(format!(
                    "malformed sort clause '{}'",
                    clause
                )));
            }
            Ok(SortSpec {
                field: field.to_string(),
                direction,
            })
        })
        .collect()
}

fn parse_sort_object(object: &Map<String, Value>) -> PlannerResult<Vec<SortSpec>> {
    object
        .iter()
        .map(|(field, direction)| {
            let direction = match direction {
                Value::String(s) => SortDirection::parse(s),
                Value::Number(n) if n.as_i64() == Some(1) => SortDirection::Asc,
                Value::Number(_) => SortDirection::Desc,
                _ => {
                    return Err(PlannerError::invalid_field(
                        field.as_str(),
                        "sort direction must be a string or number",
                    ))
                }
            };
            Ok(SortSpec {
                field: field.clone(),
                direction,
            })
        })
        .collect()
}

fn parse_count(name: &str, value: &Value) -> PlannerResult<Option<u64>> {
    let invalid = || PlannerError::query_invalid(format!("{} must be a non-negative integer", name));
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_u64().map(Some).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

/// `["*"]`, `"*"`, `null` and `[]` select everything
fn parse_select(value: &Value) -> PlannerResult<Select> {
    let fields = match value {
        Value::Null => return Ok(Select::All),
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| PlannerError::query_invalid("select entries must be strings"))
            })
            .collect::<PlannerResult<Vec<_>>>()?,
        _ => return Err(PlannerError::query_invalid("select must be an array of field names")),
    };

    if fields.is_empty() || fields.iter().any(|f| f == "*") {
        Ok(Select::All)
    } else {
        Ok(Select::Fields(fields))
    }
}
