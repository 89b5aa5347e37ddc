//! # Model Registry
//!
//! Explicit, owned registry of model metadata by kind. Lives in the adapter
//! context; registration and teardown are explicit calls.

use std::collections::HashMap;

use thiserror::Error;

use super::metadata::ModelMetadata;
use crate::observability::{Event, Logger};

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Model already registered: {0}")]
    DuplicateModel(String),

    #[error("Unknown model: {0}")]
    UnknownModel(String),
}

impl RegistryError {
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::DuplicateModel(_) => "E_DUPLICATE_MODEL",
            RegistryError::UnknownModel(_) => "E_UNKNOWN_MODEL",
        }
    }
}

/// Registered models by kind
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelMetadata>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model. Fails if the kind is already registered.
    pub fn register(&mut self, model: ModelMetadata) -> RegistryResult<()> {
        if self.models.contains_key(&model.kind) {
            return Err(RegistryError::DuplicateModel(model.kind));
        }

        Logger::info(
            Event::ModelRegistered,
            &[
                ("kind", model.kind.as_str()),
                ("primary_key", model.primary_key_column.as_str()),
                ("unique", model.unique.len().to_string().as_str()),
            ],
        );
        self.models.insert(model.kind.clone(), model);
        Ok(())
    }

    pub fn get(&self, kind: &str) -> RegistryResult<&ModelMetadata> {
        self.models
            .get(kind)
            .ok_or_else(|| RegistryError::UnknownModel(kind.to_string()))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.models.contains_key(kind)
    }

    /// Remove one model, returning its metadata
    pub fn teardown(&mut self, kind: &str) -> RegistryResult<ModelMetadata> {
        let model = self
            .models
            .remove(kind)
            .ok_or_else(|| RegistryError::UnknownModel(kind.to_string()))?;
        Logger::info(Event::ModelTornDown, &[("kind", kind)]);
        Ok(model)
    }

    /// Remove every model
    pub fn teardown_all(&mut self) {
        let mut kinds: Vec<String> = self.models.keys().cloned().collect();
        kinds.sort();
        for kind in kinds {
            self.models.remove(&kind);
            Logger::info(Event::ModelTornDown, &[("kind", kind.as_str())]);
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
