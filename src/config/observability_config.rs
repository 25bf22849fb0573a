//! Observability configuration parsing from environment variables.

use super::race_config::parse_var;
use anyhow::Result;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid LOG_FORMAT: {}. Must be 'pretty' or 'json'", s),
        }
    }
}

/// Observability environment configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservabilityEnvConfig {
    pub log_format: LogFormat,
    pub metrics_enabled: bool,
}

impl ObservabilityEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.trim().parse::<LogFormat>()?,
            None => LogFormat::default(),
        };
        Ok(Self {
            log_format,
            metrics_enabled: parse_var(&lookup, "METRICS_ENABLED", false)?,
        })
    }
}
