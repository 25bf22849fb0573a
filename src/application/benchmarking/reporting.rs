use crate::domain::events::{ProgressReporter, RaceLineup};
use crate::domain::race::{Measurement, WorkloadCase};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceStatus {
    Running,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub workload: String,
    pub strategy: String,
    pub measurement: Measurement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceReport {
    pub timestamp: DateTime<Utc>,
    pub configuration: String,
    pub strategies: Vec<String>,
    pub workloads: Vec<WorkloadCase>,
    pub cells: Vec<CellRecord>,
    /// Winning strategy per completed row, `None` when the whole row failed.
    pub row_winners: Vec<Option<String>>,
    pub totals: Vec<f64>,
    pub winners: Vec<String>,
    pub status: RaceStatus,
}

#[derive(Debug, Default)]
struct Collected {
    lineup: Option<RaceLineup>,
    cells: Vec<CellRecord>,
    row_winners: Vec<Option<String>>,
    totals: Vec<f64>,
    winners: Vec<String>,
    status: Option<RaceStatus>,
}

impl Collected {
    fn strategy_id(&self, col: usize) -> String {
        self.lineup
            .as_ref()
            .and_then(|l| l.strategy_ids.get(col).cloned())
            .unwrap_or_else(|| format!("#{}", col))
    }

    fn workload_id(&self, row: usize) -> String {
        self.lineup
            .as_ref()
            .and_then(|l| l.workloads.get(row).map(|w| w.id.clone()))
            .unwrap_or_else(|| format!("#{}", row))
    }
}

/// Reporter that retains the whole race so it can be turned into a `RaceReport`.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct ReportCollector {
    inner: Arc<Mutex<Collected>>,
}

impl ReportCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Collected> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn cell_count(&self) -> usize {
        self.lock().cells.len()
    }

    pub fn report(&self) -> RaceReport {
        let collected = self.lock();
        let (configuration, strategies, workloads) = match &collected.lineup {
            Some(lineup) => (
                format!(
                    "min={}ms share={}",
                    lineup.minimum_duration_ms, lineup.shared_context
                ),
                lineup.strategy_ids.clone(),
                lineup.workloads.clone(),
            ),
            None => (String::new(), Vec::new(), Vec::new()),
        };

        RaceReport {
            timestamp: Utc::now(),
            configuration,
            strategies,
            workloads,
            cells: collected.cells.clone(),
            row_winners: collected.row_winners.clone(),
            totals: collected.totals.clone(),
            winners: collected.winners.clone(),
            status: collected.status.unwrap_or(RaceStatus::Running),
        }
    }
}

impl ProgressReporter for ReportCollector {
    fn on_race_started(&self, lineup: &RaceLineup) {
        *self.lock() = Collected {
            lineup: Some(lineup.clone()),
            totals: vec![0.0; lineup.columns()],
            status: Some(RaceStatus::Running),
            ..Collected::default()
        };
    }

    fn on_cell(&self, row: usize, col: usize, measurement: &Measurement) {
        let mut collected = self.lock();
        let record = CellRecord {
            workload: collected.workload_id(row),
            strategy: collected.strategy_id(col),
            measurement: measurement.clone(),
        };
        collected.cells.push(record);
    }

    fn on_row_completed(&self, _row: usize, winner_col: Option<usize>, totals: &[f64]) {
        let mut collected = self.lock();
        let winner = winner_col.map(|col| collected.strategy_id(col));
        collected.row_winners.push(winner);
        collected.totals = totals.to_vec();
    }

    fn on_race_completed(&self, winners: &[String], totals: &[f64]) {
        let mut collected = self.lock();
        collected.winners = winners.to_vec();
        collected.totals = totals.to_vec();
        collected.status = Some(RaceStatus::Completed);
    }

    fn on_race_cancelled(&self, _row: usize, _col: usize) {
        self.lock().status = Some(RaceStatus::Cancelled);
    }
}

/// Persists race reports as pretty JSON files.
pub struct RaceReportWriter {
    output_dir: PathBuf,
}

impl RaceReportWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let path = output_dir.as_ref().to_path_buf();
        if !path.exists() {
            fs::create_dir_all(&path).with_context(|| {
                format!("Failed to create report directory {}", path.display())
            })?;
        }
        Ok(Self { output_dir: path })
    }

    pub fn write(&self, report: &RaceReport) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        let filename = format!(
            "race_report_{}.json",
            report.timestamp.format("%Y%m%d_%H%M%S")
        );
        let path = self.output_dir.join(filename);
        fs::write(&path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;

        info!("Race report saved to: {}", path.display());
        Ok(path)
    }
}
