//! Progress reporter feeding the Prometheus registry.

use crate::domain::events::{ProgressReporter, RaceLineup};
use crate::domain::race::Measurement;
use crate::infrastructure::observability::metrics::Metrics;
use std::sync::{Mutex, PoisonError};

/// Translates race events into metric updates.
pub struct MetricsReporter {
    metrics: Metrics,
    strategy_ids: Mutex<Vec<String>>,
}

impl MetricsReporter {
    pub fn new(metrics: Metrics) -> Self {
        Self {
            metrics,
            strategy_ids: Mutex::new(Vec::new()),
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn strategy_label(&self, col: usize) -> String {
        self.strategy_ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(col)
            .cloned()
            .unwrap_or_else(|| format!("#{}", col))
    }
}

impl ProgressReporter for MetricsReporter {
    fn on_race_started(&self, lineup: &RaceLineup) {
        *self
            .strategy_ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = lineup.strategy_ids.clone();
    }

    fn on_cell(&self, _row: usize, col: usize, measurement: &Measurement) {
        self.metrics.observe_cell(
            &self.strategy_label(col),
            measurement.is_failed(),
            measurement.average_duration_ms,
        );
    }

    fn on_row_completed(&self, _row: usize, _winner_col: Option<usize>, _totals: &[f64]) {
        self.metrics.rows_completed_total.inc();
    }

    fn on_race_completed(&self, _winners: &[String], _totals: &[f64]) {
        self.metrics.inc_races("completed");
    }

    fn on_race_cancelled(&self, _row: usize, _col: usize) {
        self.metrics.inc_races("cancelled");
    }
}
