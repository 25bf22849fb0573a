//! Configuration module for queryrace.
//!
//! Settings come from the environment (a `.env` file is honoured by the binary),
//! organized by concern: Race and Observability.

mod observability_config;
mod race_config;

pub use observability_config::{LogFormat, ObservabilityEnvConfig};
pub use race_config::{
    DEFAULT_DOCUMENT_SEED, DEFAULT_DOCUMENT_SIZE, DEFAULT_TRACK_WIDTH, RaceEnvConfig,
    parse_strategy_list,
};

use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub race: RaceEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            race: RaceEnvConfig::from_lookup(&lookup).context("Failed to load race config")?,
            observability: ObservabilityEnvConfig::from_lookup(&lookup)
                .context("Failed to load observability config")?,
        })
    }
}
