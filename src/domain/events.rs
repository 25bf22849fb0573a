use crate::domain::race::{Measurement, WorkloadCase, format_total};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Who is racing on what, announced once when a race starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceLineup {
    pub workloads: Vec<WorkloadCase>,
    pub strategy_ids: Vec<String>,
    pub strategy_names: Vec<String>,
    pub minimum_duration_ms: u64,
    pub shared_context: bool,
}

impl RaceLineup {
    pub fn rows(&self) -> usize {
        self.workloads.len()
    }

    pub fn columns(&self) -> usize {
        self.strategy_ids.len()
    }
}

/// Receives race progress. Calls are made synchronously from inside `step()`,
/// so implementations must return quickly and never block.
pub trait ProgressReporter: Send + Sync {
    fn on_race_started(&self, _lineup: &RaceLineup) {}

    fn on_cell(&self, row: usize, col: usize, measurement: &Measurement);

    /// `winner_col` is `None` when every cell of the row failed.
    fn on_row_completed(&self, row: usize, winner_col: Option<usize>, totals: &[f64]);

    fn on_race_completed(&self, winners: &[String], totals: &[f64]);

    /// The race stopped at `(row, col)` before completing.
    fn on_race_cancelled(&self, _row: usize, _col: usize) {}
}

/// Reporter that narrates the race through `tracing`.
pub struct LoggingReporter;

impl ProgressReporter for LoggingReporter {
    fn on_race_started(&self, lineup: &RaceLineup) {
        info!(
            "Race started: {} workloads x {} strategies ({}), min {}ms",
            lineup.rows(),
            lineup.columns(),
            lineup.strategy_ids.join(", "),
            lineup.minimum_duration_ms
        );
    }

    fn on_cell(&self, row: usize, col: usize, measurement: &Measurement) {
        if measurement.is_failed() {
            warn!("Cell [{}, {}] failed", row, col);
        } else {
            debug!(
                "Cell [{}, {}]: {} ({} samples)",
                row,
                col,
                measurement.cell_text(),
                measurement.sample_count
            );
        }
    }

    fn on_row_completed(&self, row: usize, winner_col: Option<usize>, _totals: &[f64]) {
        match winner_col {
            Some(col) => info!("Row {} completed, winner column {}", row, col),
            None => warn!("Row {} completed without a winner", row),
        }
    }

    fn on_race_completed(&self, winners: &[String], totals: &[f64]) {
        let rendered: Vec<String> = totals.iter().map(|t| format_total(*t)).collect();
        info!(
            "Race completed. Winner(s): {} | totals: [{}]",
            winners.join(", "),
            rendered.join(", ")
        );
    }

    fn on_race_cancelled(&self, row: usize, col: usize) {
        warn!("Race cancelled at row {}, column {}", row, col);
    }
}
