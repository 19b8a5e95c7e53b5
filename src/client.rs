use std::{
    collections::HashMap,
    sync::{Arc, Once},
};

use crate::{
    experiment::Event, registry::Registry, sharder::Djb2Sharder, ClientConfig, Logger, Result,
};

/// The entry point for rolling users into experiments and firing events.
///
/// Every method hands the resulting protocol line to the configured [`Logger`] and never fails:
/// problems are reported through [`Logger::warn`].
///
/// Create one client per process and share it. The registry build and the [`Client::warmup`]
/// dump happen once per client (clients created from one
/// [`RegistryStore`](crate::registry_store::RegistryStore) share the build), so a second client
/// would emit a second `YATZ_DUMP` line.
///
/// # Examples
/// ```
/// # use yatz::{ClientConfig, DefinitionSet};
/// let definitions = DefinitionSet::from_json_str(r#"
///   {"experiments": [{
///     "name": "checkout_flow",
///     "type": "abtest",
///     "variants": [{"name": "Control"}, {"name": "one_page"}]
///   }]}
/// "#).unwrap();
/// let client = ClientConfig::from_definitions(definitions).to_client().unwrap();
///
/// client.warmup();
/// let variant = client.roll("user-1", "checkout_flow");
/// assert!(variant == "Control" || variant == "one_page");
/// client.fire("user-1", "purchase", 19.99);
/// ```
pub struct Client<'a> {
    registry: Arc<Registry>,
    logger: Box<dyn Logger + Send + Sync + 'a>,
    warmup: Once,
}

impl<'a> Client<'a> {
    /// Create a new `Client`, building the experiment registry if it hasn't been built yet.
    ///
    /// # Errors
    ///
    /// Fails if the experiment definitions are invalid.
    pub fn new(config: ClientConfig<'a>) -> Result<Self> {
        let registry = config.registry_store.get_registry().map_err(|err| {
            log::error!(target: "yatz", "invalid experiment definitions: {}", err);
            err
        })?;

        Ok(Client {
            registry,
            logger: config.logger,
            warmup: Once::new(),
        })
    }

    /// Fire an event with a unique identifier. The count is `1.0`.
    pub fn fire_with_identifier(&self, user: &str, event_name: &str, identifier: &str) {
        self.fire_event(user, &Event::with_identifier(event_name, identifier));
    }

    /// Fire an event with a count.
    pub fn fire(&self, user: &str, event_name: &str, count: f64) {
        self.fire_event(user, &Event::new(event_name, count));
    }

    pub fn fire_event(&self, user: &str, event: &Event) {
        let line = self.registry.dump_event(user, event, &Djb2Sharder);
        log::trace!(target: "yatz", user, event:display = event.name; "firing event");
        self.logger.info(&line);
    }

    /// Return the variant `user` is in for the experiment named `experiment_name`.
    ///
    /// The exposure is fired as a `rolled__<experiment>` event with the user as identifier.
    /// Returns an empty string if there is no such experiment.
    pub fn roll(&self, user: &str, experiment_name: &str) -> String {
        self.fire_with_identifier(user, &format!("rolled__{experiment_name}"), user);

        match self.registry.roll(experiment_name, user, &Djb2Sharder) {
            Ok(variant) => variant.to_owned(),
            Err(_) => {
                self.logger.warn(format_args!(
                    "Unable to find experiment named: {}",
                    experiment_name
                ));
                String::new()
            }
        }
    }

    /// Return the variant `user` is in for every experiment. No events are fired.
    pub fn get_all(&self, user: &str) -> HashMap<String, String> {
        self.registry.roll_all(user, None, &Djb2Sharder)
    }

    /// Like [`Client::get_all`], but alternate-key experiments are rolled by `alternate_key`.
    ///
    /// `alternate_key` is used as given, even when empty.
    pub fn get_all_by_user_or_alternate_key(
        &self,
        user: &str,
        alternate_key: &str,
    ) -> HashMap<String, String> {
        self.registry
            .roll_all(user, Some(alternate_key), &Djb2Sharder)
    }

    /// Emit the `YATZ_DUMP` line describing all experiments. Only the first call on a client
    /// emits anything, so it is safe to call from every warmup hook.
    pub fn warmup(&self) {
        self.warmup.call_once(|| {
            log::debug!(target: "yatz", "dumping active experiments");
            self.logger.info(&self.dump_experiments());
        });
    }

    /// The `YATZ_DUMP` line [`Client::warmup`] emits.
    pub fn dump_experiments(&self) -> String {
        self.registry.dump()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
