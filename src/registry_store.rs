//! One-time, thread-safe construction of a [`Registry`].
use std::sync::{Arc, OnceLock};

use crate::{experiment::DefinitionSet, registry::Registry, Result};

/// `RegistryStore` holds a [`DefinitionSet`] and builds its [`Registry`] on first access.
///
/// The build runs exactly once. Concurrent first callers block until it completes, and all of
/// them receive the same registry (or the same error).
pub struct RegistryStore {
    definitions: DefinitionSet,
    registry: OnceLock<Result<Arc<Registry>>>,
}

impl RegistryStore {
    pub fn new(definitions: DefinitionSet) -> Self {
        Self {
            definitions,
            registry: OnceLock::new(),
        }
    }

    /// Get the registry, building it if this is the first call.
    pub fn get_registry(&self) -> Result<Arc<Registry>> {
        self.registry
            .get_or_init(|| Registry::build(self.definitions.clone()).map(Arc::new))
            .clone()
    }

    /// Whether the registry has already been built (successfully or not).
    pub fn is_built(&self) -> bool {
        self.registry.get().is_some()
    }
}
