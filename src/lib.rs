//! `yatz` deterministically assigns users to experiment variants and writes exposures and
//! application events as single-line log records that an analytics pipeline can pick up.
//!
//! # Overview
//!
//! Experiments are described by a [`DefinitionSet`]: each [`Experiment`] has an ordered list of
//! weighted [`Variant`]s, optionally with a whitelist of users forced into that variant. The
//! definitions are compiled once into an immutable [`Registry`] holding a bucket table and a
//! whitelist lookup per experiment.
//!
//! Rolling a user hashes the experiment name followed by the user id (djb2), expands the hash into
//! a seed for a ChaCha8 generator and draws a bucket. The same experiment and user always
//! land in the same variant for as long as the definition doesn't change, across restarts and
//! machines.
//!
//! The [`Client`] ties everything together. It fires `YATZ_EVENT` lines for events and exposures,
//! and a single `YATZ_DUMP` line at warmup listing experiment definitions, handing each line to a
//! [`Logger`]. The [`protocol`] module parses both kinds of lines back.
//!
//! ```
//! # use yatz::{ClientConfig, DefinitionSet, Experiment, ExperimentType, Variant, CONTROL};
//! let definitions = DefinitionSet::from(vec![Experiment::new(
//!     "button_color",
//!     ExperimentType::Standard,
//!     [
//!         Variant::new(CONTROL, 1),
//!         Variant::new("green", 3).with_whitelist(["qa-user"]),
//!     ],
//! )]);
//! let client = ClientConfig::from_definitions(definitions).to_client()?;
//!
//! client.warmup();
//! assert_eq!(client.roll("qa-user", "button_color"), "green");
//! client.fire_with_identifier("qa-user", "purchase", "order-17");
//! # Ok::<(), yatz::Error>(())
//! ```
//!
//! # Error Handling
//!
//! Errors are represented by the [`Error`] enum. Invalid definitions are reported when the client
//! is created and should be treated as fatal. Once a client exists, its methods never fail:
//! rolling an unknown experiment logs a warning and returns an empty string.
//!
//! # Logging
//!
//! Protocol lines go to the configured [`Logger`], which by default forwards them to the
//! [`log`](https://docs.rs/log/latest/log/) crate under the `yatz` target. Diagnostics are logged
//! with the `log` crate as well.

#![warn(rustdoc::missing_crate_level_docs)]

mod client;
mod config;
mod error;
mod eval;
mod experiment;
mod logger;
mod registry;

pub mod dump;
pub mod protocol;
pub mod registry_store;
pub mod sharder;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use experiment::{DefinitionSet, Event, Experiment, ExperimentType, Variant, CONTROL};
pub use logger::{LogLogger, Logger, NoopLogger};
pub use registry::{CompiledExperiment, Registry};
