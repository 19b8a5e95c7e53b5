use std::sync::Arc;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    #[error("experiment not found: {0}")]
    ExperimentNotFound(String),
    #[error("experiment {experiment} has zero total weight")]
    ZeroTotalWeight { experiment: String },
    #[error("experiment {experiment} has no variants")]
    NoVariants { experiment: String },
    #[error("experiment {0} is defined more than once")]
    DuplicateExperiment(String),
    #[error("invalid name {name:?} in experiment {experiment:?}")]
    InvalidName { experiment: String, name: String },
    #[error("error parsing experiment definitions")]
    ConfigurationParseError(#[source] Arc<serde_json::Error>),
    // std::io::Error is not clonable, so we're wrapping it in an Arc.
    #[error(transparent)]
    Io(Arc<std::io::Error>),
    #[error("malformed log line: {0}")]
    MalformedLine(String),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(Arc::new(value))
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::ConfigurationParseError(Arc::new(value))
    }
}
