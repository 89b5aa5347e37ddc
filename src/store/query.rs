//! Native query objects
//!
//! A `StoreQuery` is what the store executes: conjunctive filters only, an
//! optional structural key filter, orders, limit/offset, projection, and an
//! optional start cursor. The store has no OR.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::Entity;
use super::key::Key;

/// Reserved property name addressing an entity's key
pub const KEY_PROPERTY: &str = "__key__";

/// Native comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NativeOp {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessThanOrEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
}

impl NativeOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            NativeOp::Equal => "=",
            NativeOp::NotEqual => "!=",
            NativeOp::LessThan => "<",
            NativeOp::LessThanOrEqual => "<=",
            NativeOp::GreaterThan => ">",
            NativeOp::GreaterThanOrEqual => ">=",
        }
    }
}

impl fmt::Display for NativeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Right-hand side of a filter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterValue {
    Value(Value),
    Key(Key),
}

/// One conjunctive filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyFilter {
    pub property: String,
    pub op: NativeOp,
    pub value: FilterValue,
}

impl PropertyFilter {
    /// True for filters that address the key structurally
    pub fn is_key_filter(&self) -> bool {
        matches!(self.value, FilterValue::Key(_))
    }
}

/// One sort clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyOrder {
    pub property: String,
    pub descending: bool,
}

/// Opaque continuation token issued by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The store's "more results" sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoreResults {
    /// The batch was cut short; more may follow the end cursor
    NotFinished,
    /// The query limit was reached and more results exist
    MoreResultsAfterLimit,
    /// The end cursor was reached and more results exist
    MoreResultsAfterCursor,
    /// Nothing remains
    NoMoreResults,
}

impl MoreResults {
    /// Anything but `NoMoreResults` means the caller may continue
    pub fn has_more(&self) -> bool {
        !matches!(self, MoreResults::NoMoreResults)
    }
}

/// Paging information returned alongside a page of entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub end_cursor: Option<Cursor>,
    pub more_results: MoreResults,
}

impl PageInfo {
    /// Page info for a result set that is complete
    pub fn exhausted() -> Self {
        Self {
            end_cursor: None,
            more_results: MoreResults::NoMoreResults,
        }
    }
}

/// One page of a query.
///
/// A `None` slot is a placeholder for a key lookup whose entity no longer exists.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage {
    pub entities: Vec<Option<Entity>>,
    pub info: PageInfo,
}

/// A native, conjunctive store query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreQuery {
    pub namespace: Option<String>,
    pub kind: String,
    pub filters: Vec<PropertyFilter>,
    pub orders: Vec<PropertyOrder>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub projection: Vec<String>,
    pub keys_only: bool,
    pub start: Option<Cursor>,
}

impl StoreQuery {
    /// Unfiltered query over one kind
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            namespace: None,
            kind: kind.into(),
            filters: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            projection: Vec::new(),
            keys_only: false,
            start: None,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    /// Add a property filter
    pub fn filter(mut self, property: impl Into<String>, op: NativeOp, value: Value) -> Self {
        self.filters.push(PropertyFilter {
            property: property.into(),
            op,
            value: FilterValue::Value(value),
        });
        self
    }

    /// Add a structural key filter
    pub fn key_filter(mut self, op: NativeOp, key: Key) -> Self {
        self.filters.push(PropertyFilter {
            property: KEY_PROPERTY.to_string(),
            op,
            value: FilterValue::Key(key),
        });
        self
    }

    pub fn order(mut self, property: impl Into<String>, descending: bool) -> Self {
        self.orders.push(PropertyOrder {
            property: property.into(),
            descending,
        });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Restrict returned properties
    pub fn select(mut self, properties: Vec<String>) -> Self {
        self.projection = properties;
        self
    }

    pub fn keys_only(mut self) -> Self {
        self.keys_only = true;
        self.projection.clear();
        self
    }

    pub fn start(mut self, cursor: Cursor) -> Self {
        self.start = Some(cursor);
        self
    }

    /// The key addressed by an equality key filter, if this query is a key lookup
    pub fn key_lookup(&self) -> Option<&Key> {
        self.filters.iter().find_map(|f| match (&f.op, &f.value) {
            (NativeOp::Equal, FilterValue::Key(key)) => Some(key),
            _ => None,
        })
    }
}
