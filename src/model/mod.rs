//! Model subsystem
//!
//! Metadata the engine reads per collection, the registry that owns it, and
//! the entity/record mapping at the ORM boundary.

mod metadata;
mod record;
mod registry;

pub use metadata::{ModelMetadata, UniqueAttribute};
pub use record::{column_value, Record, RecordError, RecordResult};
pub use registry::{ModelRegistry, RegistryError, RegistryResult};
