//! Adapter context
//!
//! Everything an operation needs, owned in one place and passed explicitly:
//! the store client, the model registry, configuration and metrics.

use std::sync::Arc;

use crate::config::AdapterConfig;
use crate::model::{ModelMetadata, ModelRegistry, RegistryResult};
use crate::observability::MetricsRegistry;
use crate::store::StoreClient;

pub struct AdapterContext {
    client: Arc<dyn StoreClient>,
    registry: ModelRegistry,
    config: AdapterConfig,
    metrics: MetricsRegistry,
}

impl AdapterContext {
    pub fn new(client: Arc<dyn StoreClient>, config: AdapterConfig) -> Self {
        Self {
            client,
            registry: ModelRegistry::new(),
            config,
            metrics: MetricsRegistry::new(),
        }
    }

    pub fn client(&self) -> &dyn StoreClient {
        self.client.as_ref()
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    pub fn register(&mut self, model: ModelMetadata) -> RegistryResult<()> {
        self.registry.register(model)
    }

    pub fn teardown(&mut self, kind: &str) -> RegistryResult<ModelMetadata> {
        self.registry.teardown(kind)
    }

    pub fn teardown_all(&mut self) {
        self.registry.teardown_all();
    }
}
