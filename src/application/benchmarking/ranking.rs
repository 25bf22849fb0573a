use crate::domain::race::Measurement;

/// Running totals per strategy column plus the best cell of the row in progress.
#[derive(Debug, Clone)]
pub struct RankingAggregator {
    totals: Vec<f64>,
    row_best: Option<(usize, f64)>,
}

impl RankingAggregator {
    pub fn new(strategy_count: usize) -> Self {
        Self {
            totals: vec![0.0; strategy_count],
            row_best: None,
        }
    }

    /// Add a cell to its column total and to the current row's winner tracking.
    ///
    /// Failed cells count toward the total with their fallback duration but never
    /// win a row. Equal times keep the earlier column.
    pub fn record(&mut self, col: usize, measurement: &Measurement) {
        self.totals[col] += measurement.average_duration_ms;

        if measurement.is_failed() {
            return;
        }
        let beats_best = match self.row_best {
            Some((_, best)) => measurement.average_duration_ms < best,
            None => true,
        };
        if beats_best {
            self.row_best = Some((col, measurement.average_duration_ms));
        }
    }

    /// Close the current row, returning its winning column.
    pub fn finish_row(&mut self) -> Option<usize> {
        self.row_best.take().map(|(col, _)| col)
    }

    pub fn totals(&self) -> &[f64] {
        &self.totals
    }

    /// Lowest running total so far.
    pub fn best_total(&self) -> f64 {
        self.totals.iter().copied().fold(f64::MAX, f64::min)
    }

    /// Every column whose total equals the minimum. Ties are all reported.
    pub fn overall_winners(&self) -> Vec<usize> {
        let min = self.best_total();
        self.totals
            .iter()
            .enumerate()
            .filter(|(_, total)| **total <= min)
            .map(|(col, _)| col)
            .collect()
    }
}
