use std::{path::Path, sync::Arc};

use crate::{
    logger::LogLogger, registry_store::RegistryStore, Client, DefinitionSet, Logger, Result,
};

/// Configuration for [`Client`].
///
/// # Examples
/// ```
/// # use yatz::{ClientConfig, DefinitionSet};
/// let client = ClientConfig::from_definitions(DefinitionSet::default())
///     .logger(yatz::NoopLogger)
///     .to_client()
///     .unwrap();
/// ```
pub struct ClientConfig<'a> {
    pub(crate) registry_store: Arc<RegistryStore>,
    pub(crate) logger: Box<dyn Logger + Send + Sync + 'a>,
}

impl<'a> ClientConfig<'a> {
    /// Create a configuration for the given experiment definitions. Protocol lines go to the
    /// [`log`] crate until another logger is set.
    pub fn from_definitions(definitions: DefinitionSet) -> Self {
        Self::from_registry_store(Arc::new(RegistryStore::new(definitions)))
    }

    /// Load experiment definitions from a JSON file.
    ///
    /// ```no_run
    /// # use yatz::ClientConfig;
    /// let config = ClientConfig::from_file("experiments.json").unwrap();
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_definitions(DefinitionSet::from_file(path)?))
    }

    /// Share an existing store, so that clients created from it reuse a single registry build.
    pub fn from_registry_store(registry_store: Arc<RegistryStore>) -> Self {
        ClientConfig {
            registry_store,
            logger: Box::new(LogLogger),
        }
    }

    /// Set the logger that receives `YATZ_EVENT` and `YATZ_DUMP` lines and warnings.
    pub fn logger(mut self, logger: impl Logger + Send + Sync + 'a) -> Self {
        self.logger = Box::new(logger);
        self
    }

    /// Create a new [`Client`] using the specified configuration.
    ///
    /// # Errors
    ///
    /// Fails if the experiment definitions are invalid. See [`Registry::build`](crate::Registry::build).
    pub fn to_client(self) -> Result<Client<'a>> {
        Client::new(self)
    }
}
