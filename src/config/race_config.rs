//! Race configuration parsing from environment variables.

use crate::application::benchmarking::DEFAULT_MINIMUM_DURATION_MS;
use crate::application::strategies::DEFAULT_STRATEGIES;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_TRACK_WIDTH: usize = 60;
pub const DEFAULT_DOCUMENT_SIZE: usize = 2000;
pub const DEFAULT_DOCUMENT_SEED: u64 = 42;

/// Race environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RaceEnvConfig {
    pub minimum_duration_ms: u64,
    pub share_context: bool,
    pub show_track: bool,
    pub track_width: usize,
    pub strategies: Vec<String>,
    pub document_size: usize,
    pub document_seed: u64,
    pub report_dir: Option<PathBuf>,
}

impl Default for RaceEnvConfig {
    fn default() -> Self {
        Self {
            minimum_duration_ms: DEFAULT_MINIMUM_DURATION_MS,
            share_context: true,
            show_track: true,
            track_width: DEFAULT_TRACK_WIDTH,
            strategies: DEFAULT_STRATEGIES.iter().map(|s| s.to_string()).collect(),
            document_size: DEFAULT_DOCUMENT_SIZE,
            document_seed: DEFAULT_DOCUMENT_SEED,
            report_dir: None,
        }
    }
}

pub(super) fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid {}: {}", key, raw)),
        None => Ok(default),
    }
}

/// Comma-separated list, blanks dropped.
pub fn parse_strategy_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl RaceEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            minimum_duration_ms: parse_var(
                &lookup,
                "RACE_MIN_DURATION_MS",
                defaults.minimum_duration_ms,
            )?,
            share_context: parse_var(&lookup, "RACE_SHARE_CONTEXT", defaults.share_context)?,
            show_track: parse_var(&lookup, "RACE_TRACK", defaults.show_track)?,
            track_width: parse_var(&lookup, "RACE_TRACK_WIDTH", defaults.track_width)?,
            strategies: lookup("RACE_STRATEGIES")
                .map(|raw| parse_strategy_list(&raw))
                .unwrap_or(defaults.strategies),
            document_size: parse_var(&lookup, "RACE_DOCUMENT_SIZE", defaults.document_size)?,
            document_seed: parse_var(&lookup, "RACE_DOCUMENT_SEED", defaults.document_seed)?,
            report_dir: lookup("RACE_REPORT_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}
