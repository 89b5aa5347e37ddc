//! Raw store entities

use serde::Serialize;
use serde_json::{Map, Value};

use super::key::Key;

/// An entity as the store returns it: a key plus a flat property map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub key: Key,
    pub properties: Map<String, Value>,
}

impl Entity {
    pub fn new(key: Key, properties: Map<String, Value>) -> Self {
        Self { key, properties }
    }

    /// Entity with no properties (keys-only results)
    pub fn key_only(key: Key) -> Self {
        Self::new(key, Map::new())
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn into_key(self) -> Key {
        self.key
    }

    /// Property value, if present
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}
