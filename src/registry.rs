//! Registry of compiled experiments, derived once from a [`DefinitionSet`].
use std::collections::{hash_map::Entry, HashMap};

use crate::{
    experiment::{DefinitionSet, Experiment, ExperimentType},
    Error, Result,
};

/// Characters that delimit fields in log lines and therefore cannot appear in experiment or
/// variant names.
pub(crate) const RESERVED_CHARS: [char; 5] = [':', '|', ',', '@', '/'];

/// An immutable, read-only view of all active experiments.
///
/// `Registry` is built with [`Registry::build`] and is safe to share between threads.
#[derive(Debug)]
pub struct Registry {
    /// Experiments in declaration order.
    experiments: Vec<CompiledExperiment>,
    index: HashMap<String, usize>,
}

/// An experiment together with its derived bucket table and whitelist lookup.
#[derive(Debug)]
pub struct CompiledExperiment {
    experiment: Experiment,
    /// Slot `i` holds the index of the variant owning that slot.
    bucket_table: Vec<usize>,
    /// User id -> variant index.
    whitelist: HashMap<String, usize>,
}

impl Registry {
    /// Compile `definitions` into a registry.
    ///
    /// # Errors
    ///
    /// Fails on misconfiguration that would make bucketing or serialization impossible:
    /// - [`Error::NoVariants`] or [`Error::ZeroTotalWeight`] if an experiment has nothing to draw
    ///   from.
    /// - [`Error::DuplicateExperiment`] if two experiments share a name.
    /// - [`Error::InvalidName`] if an experiment or variant name is empty or contains a log line
    ///   delimiter.
    pub fn build(definitions: DefinitionSet) -> Result<Registry> {
        let mut experiments = Vec::with_capacity(definitions.experiments.len());
        let mut index = HashMap::with_capacity(definitions.experiments.len());

        for experiment in definitions.experiments {
            let compiled = CompiledExperiment::compile(experiment)?;
            match index.entry(compiled.name().to_owned()) {
                Entry::Occupied(entry) => {
                    return Err(Error::DuplicateExperiment(entry.key().clone()));
                }
                Entry::Vacant(entry) => {
                    entry.insert(experiments.len());
                }
            }
            experiments.push(compiled);
        }

        log::debug!(target: "yatz", experiments = experiments.len(); "built experiment registry");

        Ok(Registry { experiments, index })
    }

    pub fn get(&self, experiment_name: &str) -> Option<&CompiledExperiment> {
        self.index.get(experiment_name).map(|&i| &self.experiments[i])
    }

    /// Iterate over experiments in declaration order.
    pub fn experiments(&self) -> impl Iterator<Item = &CompiledExperiment> {
        self.experiments.iter()
    }

    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }
}

impl CompiledExperiment {
    fn compile(experiment: Experiment) -> Result<CompiledExperiment> {
        validate_name(&experiment.name, &experiment.name)?;
        if experiment.variants.is_empty() {
            return Err(Error::NoVariants {
                experiment: experiment.name,
            });
        }
        for variant in &experiment.variants {
            validate_name(&experiment.name, &variant.name)?;
        }

        let total = experiment.total_weight();
        if total == 0 {
            return Err(Error::ZeroTotalWeight {
                experiment: experiment.name,
            });
        }

        let bucket_table = bin_weights(&experiment, total);

        // If a user is whitelisted in several variants, the variant declared last wins.
        let mut whitelist = HashMap::new();
        for (i, variant) in experiment.variants.iter().enumerate() {
            for user in &variant.whitelist {
                if let Some(previous) = whitelist.insert(user.clone(), i) {
                    if previous != i {
                        log::warn!(target: "yatz",
                                   experiment:display = experiment.name,
                                   user:display = user,
                                   overridden:display = experiment.variants[previous].name,
                                   variant:display = variant.name;
                                   "user is whitelisted in more than one variant");
                    }
                }
            }
        }

        Ok(CompiledExperiment {
            experiment,
            bucket_table,
            whitelist,
        })
    }

    pub fn name(&self) -> &str {
        &self.experiment.name
    }

    pub fn experiment_type(&self) -> ExperimentType {
        self.experiment.experiment_type
    }

    pub fn experiment(&self) -> &Experiment {
        &self.experiment
    }

    pub fn bucket_table(&self) -> &[usize] {
        &self.bucket_table
    }

    pub(crate) fn variant_name(&self, index: usize) -> &str {
        &self.experiment.variants[index].name
    }

    /// Variant forced for `user` by a whitelist, if any.
    pub fn whitelisted_variant(&self, user: &str) -> Option<&str> {
        self.whitelist.get(user).map(|&i| self.variant_name(i))
    }
}

/// Lay out `weight` consecutive slots for each variant, in declaration order.
fn bin_weights(experiment: &Experiment, total: u64) -> Vec<usize> {
    let mut bin = Vec::with_capacity(total as usize);
    for (i, variant) in experiment.variants.iter().enumerate() {
        bin.extend(std::iter::repeat(i).take(variant.weight as usize));
    }
    bin
}

fn validate_name(experiment: &str, name: &str) -> Result<()> {
    if name.is_empty() || name.contains(&RESERVED_CHARS[..]) {
        return Err(Error::InvalidName {
            experiment: experiment.to_owned(),
            name: name.to_owned(),
        });
    }
    Ok(())
}
