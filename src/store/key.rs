//! Structural entity keys
//!
//! A key is a namespace plus an ancestor path of `(kind, id)` elements. The
//! last element names the entity itself. Keys order by namespace, then path,
//! with numeric ids sorting before names.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of one path element
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyId {
    /// Store-allocated or caller-chosen numeric id
    Id(i64),
    /// Caller-chosen string name
    Name(String),
}

impl KeyId {
    /// Interpret a JSON value as a key identifier.
    ///
    /// Integers become ids, strings become names, anything else is not addressable.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(KeyId::Id),
            Value::String(s) => Some(KeyId::Name(s.clone())),
            _ => None,
        }
    }

    /// The identifier as it appears in a record
    pub fn to_value(&self) -> Value {
        match self {
            KeyId::Id(id) => Value::from(*id),
            KeyId::Name(name) => Value::String(name.clone()),
        }
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyId::Id(id) => write!(f, "{}", id),
            KeyId::Name(name) => write!(f, "{:?}", name),
        }
    }
}

/// One `(kind, id)` step of a key path. `id` is `None` until allocated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PathElement {
    pub kind: String,
    pub id: Option<KeyId>,
}

impl PathElement {
    pub fn new(kind: impl Into<String>, id: Option<KeyId>) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }

    /// A complete element
    pub fn with_id(kind: impl Into<String>, id: KeyId) -> Self {
        Self::new(kind, Some(id))
    }

    /// An element awaiting id allocation
    pub fn incomplete(kind: impl Into<String>) -> Self {
        Self::new(kind, None)
    }
}

/// Structural address of an entity
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key {
    pub namespace: Option<String>,
    pub path: Vec<PathElement>,
}

impl Key {
    pub fn new(namespace: Option<String>, path: Vec<PathElement>) -> Self {
        Self { namespace, path }
    }

    /// Kind of the addressed entity (last path element)
    pub fn kind(&self) -> &str {
        self.path.last().map(|e| e.kind.as_str()).unwrap_or("")
    }

    /// Identifier of the addressed entity, if allocated
    pub fn id(&self) -> Option<&KeyId> {
        self.path.last().and_then(|e| e.id.as_ref())
    }

    /// True once every path element carries an id
    pub fn is_complete(&self) -> bool {
        !self.path.is_empty() && self.path.iter().all(|e| e.id.is_some())
    }

    /// Complete the last path element
    pub fn complete_with(mut self, id: KeyId) -> Self {
        if let Some(last) = self.path.last_mut() {
            last.id = Some(id);
        }
        self
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{}:", ns)?;
        }
        for (i, element) in self.path.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            match &element.id {
                Some(id) => write!(f, "{}({})", element.kind, id)?,
                None => write!(f, "{}(?)", element.kind)?,
            }
        }
        Ok(())
    }
}
