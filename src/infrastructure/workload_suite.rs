//! Workload suites: the bundled selector list and TOML suite files.

use crate::domain::race::WorkloadCase;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const DEFAULT_QUERIES: &[&str] = &[
    "*",
    "div",
    "p",
    "h1#title",
    "#title",
    "div.note",
    "div.example",
    "p.note",
    ".toc",
    ".tocline2",
    "div.dialog",
    "div.fn, p.warning",
    "h1, h2, h3",
    "div p",
    "div > p",
    "p:first-child",
];

/// The bundled suite. The last few expressions use combinators and pseudo-classes the
/// sandbox does not support, so every strategy reports them as failed cells.
pub fn default_workloads() -> Vec<WorkloadCase> {
    DEFAULT_QUERIES
        .iter()
        .enumerate()
        .map(|(i, query)| WorkloadCase::new(format!("q{:02}", i + 1), *query))
        .collect()
}

#[derive(Debug, Deserialize)]
struct SuiteFile {
    #[serde(default)]
    workload: Vec<WorkloadCase>,
}

/// Parses a `[[workload]]` TOML suite. Ids must be unique and the suite non-empty.
pub fn parse_workload_suite(content: &str) -> Result<Vec<WorkloadCase>> {
    let suite: SuiteFile = toml::from_str(content).context("Failed to parse workload suite TOML")?;
    if suite.workload.is_empty() {
        bail!("Workload suite has no [[workload]] entries");
    }

    let mut seen = HashSet::new();
    for case in &suite.workload {
        if !seen.insert(case.id.as_str()) {
            bail!("Duplicate workload id in suite: {}", case.id);
        }
    }
    Ok(suite.workload)
}

pub fn load_workload_suite(path: &Path) -> Result<Vec<WorkloadCase>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read workload suite: {}", path.display()))?;
    parse_workload_suite(&content)
        .with_context(|| format!("Invalid workload suite: {}", path.display()))
}
