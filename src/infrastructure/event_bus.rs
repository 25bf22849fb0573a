use crate::domain::events::{ProgressReporter, RaceLineup};
use crate::domain::race::Measurement;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

/// Fans race progress events out to every subscribed reporter, in subscription order.
///
/// The bus is itself a `ProgressReporter`, so the scheduler only ever sees one.
pub struct ProgressBus {
    reporters: Arc<RwLock<Vec<Arc<dyn ProgressReporter>>>>,
}

impl ProgressBus {
    pub fn new() -> Self {
        Self {
            reporters: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn subscribe(&self, reporter: Arc<dyn ProgressReporter>) {
        self.reporters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(reporter);
    }

    /// Get count of subscribers (for testing)
    pub fn subscriber_count(&self) -> usize {
        self.reporters().len()
    }

    fn reporters(&self) -> RwLockReadGuard<'_, Vec<Arc<dyn ProgressReporter>>> {
        self.reporters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ProgressBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ProgressBus {
    fn clone(&self) -> Self {
        Self {
            reporters: Arc::clone(&self.reporters),
        }
    }
}

impl ProgressReporter for ProgressBus {
    fn on_race_started(&self, lineup: &RaceLineup) {
        for reporter in self.reporters().iter() {
            reporter.on_race_started(lineup);
        }
    }

    fn on_cell(&self, row: usize, col: usize, measurement: &Measurement) {
        for reporter in self.reporters().iter() {
            reporter.on_cell(row, col, measurement);
        }
    }

    fn on_row_completed(&self, row: usize, winner_col: Option<usize>, totals: &[f64]) {
        for reporter in self.reporters().iter() {
            reporter.on_row_completed(row, winner_col, totals);
        }
    }

    fn on_race_completed(&self, winners: &[String], totals: &[f64]) {
        for reporter in self.reporters().iter() {
            reporter.on_race_completed(winners, totals);
        }
    }

    fn on_race_cancelled(&self, row: usize, col: usize) {
        for reporter in self.reporters().iter() {
            reporter.on_race_cancelled(row, col);
        }
    }
}
