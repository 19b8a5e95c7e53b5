use std::collections::HashMap;

use crate::{
    experiment::ExperimentType,
    registry::{CompiledExperiment, Registry},
    sharder::Sharder,
    Error, Result,
};

impl Registry {
    /// Roll `user` into a variant of the experiment named `experiment_name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentNotFound`] if no such experiment is registered.
    pub fn roll(
        &self,
        experiment_name: &str,
        user: &str,
        sharder: &impl Sharder,
    ) -> Result<&str> {
        let experiment = self
            .get(experiment_name)
            .ok_or_else(|| Error::ExperimentNotFound(experiment_name.to_owned()))?;
        Ok(experiment.roll(user, sharder))
    }

    /// Roll `user` into every registered experiment.
    ///
    /// Experiments of [`ExperimentType::AlternateKey`] type are rolled by `alternate_key` instead
    /// when one is given.
    pub fn roll_all(
        &self,
        user: &str,
        alternate_key: Option<&str>,
        sharder: &impl Sharder,
    ) -> HashMap<String, String> {
        self.experiments()
            .map(|experiment| {
                let key = match (experiment.experiment_type(), alternate_key) {
                    (ExperimentType::AlternateKey, Some(alternate_key)) => alternate_key,
                    _ => user,
                };
                (
                    experiment.name().to_owned(),
                    experiment.roll(key, sharder).to_owned(),
                )
            })
            .collect()
    }
}

impl CompiledExperiment {
    /// Return the variant `user` falls into.
    ///
    /// A whitelisted user gets their whitelisted variant. Everybody else is placed by drawing a
    /// bucket seeded with the experiment name followed by the user id, so the same pair always
    /// lands in the same variant for a given definition.
    pub fn roll(&self, user: &str, sharder: &impl Sharder) -> &str {
        if let Some(variant) = self.whitelisted_variant(user) {
            log::trace!(target: "yatz",
                        experiment:display = self.name(),
                        user,
                        variant;
                        "whitelisted user");
            return variant;
        }

        let bucket_table = self.bucket_table();
        let slot = sharder.get_slot(format!("{}{}", self.name(), user), bucket_table.len());
        let variant = self.variant_name(bucket_table[slot]);

        log::trace!(target: "yatz",
                    experiment:display = self.name(),
                    user,
                    slot,
                    variant;
                    "rolled user");

        variant
    }
}
