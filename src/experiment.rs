use std::{fs::File, io::BufReader, path::Path};

use derive_more::From;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Name of the conventional control variant.
pub const CONTROL: &str = "Control";

/// The process-wide list of experiment definitions.
///
/// Definitions are supplied once as static configuration and never mutated afterwards. Order is
/// significant: it is the order of experiments in dump lines and in the experiment field of every
/// event line.
#[derive(Debug, Clone, Default, Serialize, Deserialize, From)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionSet {
    pub experiments: Vec<Experiment>,
}

impl DefinitionSet {
    /// Parse definitions from a JSON string.
    ///
    /// ```
    /// # use yatz::DefinitionSet;
    /// let definitions = DefinitionSet::from_json_str(r#"
    ///   {"experiments": [{
    ///     "name": "checkout_flow",
    ///     "type": "abtest",
    ///     "variants": [{"name": "Control"}, {"name": "one_page", "weight": 3}]
    ///   }]}
    /// "#).unwrap();
    /// assert_eq!(definitions.experiments[0].total_weight(), 4);
    /// ```
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let f = File::open(path)?;
        Self::from_reader(BufReader::new(f))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperimentType {
    /// Rolled by user id.
    #[serde(rename = "abtest")]
    Standard,
    /// Rolled by an alternate key (e.g., a phone-linked contact key) when one is available.
    #[serde(rename = "phoneAbtest")]
    AlternateKey,
}

impl ExperimentType {
    /// Name used for this type in configuration and in definition lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentType::Standard => "abtest",
            ExperimentType::AlternateKey => "phoneAbtest",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "abtest" => Some(ExperimentType::Standard),
            "phoneAbtest" => Some(ExperimentType::AlternateKey),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExperimentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experiment {
    pub name: String,
    #[serde(rename = "type")]
    pub experiment_type: ExperimentType,
    pub variants: Vec<Variant>,
}

impl Experiment {
    pub fn new(
        name: impl Into<String>,
        experiment_type: ExperimentType,
        variants: impl IntoIterator<Item = Variant>,
    ) -> Self {
        Experiment {
            name: name.into(),
            experiment_type,
            variants: variants.into_iter().collect(),
        }
    }

    /// Sum of all variant weights.
    pub fn total_weight(&self) -> u64 {
        self.variants.iter().map(|v| u64::from(v.weight)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub name: String,
    /// Relative weight. A variant with zero weight is only reachable through its whitelist.
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub whitelist: Vec<String>,
}

fn default_weight() -> u32 {
    1
}

impl Variant {
    pub fn new(name: impl Into<String>, weight: u32) -> Self {
        Variant {
            name: name.into(),
            weight,
            whitelist: Vec::new(),
        }
    }

    pub fn with_whitelist<S: Into<String>>(mut self, users: impl IntoIterator<Item = S>) -> Self {
        self.whitelist.extend(users.into_iter().map(Into::into));
        self
    }
}

/// An application event. Constructed per call and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    /// Optional identifier of the object the event is about. Empty means absent.
    pub identifier: String,
    pub count: f64,
}

impl Event {
    pub fn new(name: impl Into<String>, count: f64) -> Self {
        Event {
            name: name.into(),
            identifier: String::new(),
            count,
        }
    }

    pub fn with_identifier(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Event {
            name: name.into(),
            identifier: identifier.into(),
            count: 1.0,
        }
    }
}
