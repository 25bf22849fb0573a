//! Live results grid printed to stdout.

use crate::domain::events::{ProgressReporter, RaceLineup};
use crate::domain::race::{Measurement, format_total};
use std::sync::{Mutex, PoisonError};

const LABEL_WIDTH: usize = 10;
const MIN_CELL_WIDTH: usize = 22;

/// Text state of the results grid. Rows are rendered once they are final.
#[derive(Debug, Default)]
pub struct ResultsGrid {
    strategy_ids: Vec<String>,
    workload_ids: Vec<String>,
    pending: Vec<String>,
    cell_width: usize,
}

impl ResultsGrid {
    pub fn new(lineup: &RaceLineup) -> Self {
        let cell_width = lineup
            .strategy_ids
            .iter()
            .map(|id| id.len() + 2)
            .max()
            .unwrap_or(0)
            .max(MIN_CELL_WIDTH);
        Self {
            strategy_ids: lineup.strategy_ids.clone(),
            workload_ids: lineup.workloads.iter().map(|w| w.id.clone()).collect(),
            pending: Vec::new(),
            cell_width,
        }
    }

    fn line(&self, label: &str, cells: &[String]) -> String {
        let mut line = format!("{:<width$}", label, width = LABEL_WIDTH);
        for cell in cells {
            line.push_str(&format!("{:<width$}", cell, width = self.cell_width));
        }
        line.trim_end().to_string()
    }

    pub fn header(&self) -> String {
        self.line("", &self.strategy_ids)
    }

    pub fn push_cell(&mut self, measurement: &Measurement) {
        self.pending.push(measurement.cell_text());
    }

    /// Renders the finished row, marking the winner with `*`.
    pub fn finish_row(&mut self, row: usize, winner_col: Option<usize>) -> String {
        let mut cells = std::mem::take(&mut self.pending);
        if let Some(cell) = winner_col.and_then(|col| cells.get_mut(col)) {
            cell.push_str(" *");
        }
        let label = self
            .workload_ids
            .get(row)
            .cloned()
            .unwrap_or_else(|| row.to_string());
        self.line(&label, &cells)
    }

    /// Renders the `Total` line, marking every co-winner with `*`.
    pub fn totals(&self, winners: &[String], totals: &[f64]) -> String {
        let cells: Vec<String> = totals
            .iter()
            .enumerate()
            .map(|(col, total)| {
                let text = format_total(*total);
                let won = self
                    .strategy_ids
                    .get(col)
                    .is_some_and(|id| winners.contains(id));
                if won { format!("{} *", text) } else { text }
            })
            .collect();
        self.line("Total", &cells)
    }
}

/// Prints the results grid as the race progresses.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    grid: Mutex<ResultsGrid>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for ConsoleReporter {
    fn on_race_started(&self, lineup: &RaceLineup) {
        let grid = ResultsGrid::new(lineup);
        println!("{}", grid.header());
        *self.grid.lock().unwrap_or_else(PoisonError::into_inner) = grid;
    }

    fn on_cell(&self, _row: usize, _col: usize, measurement: &Measurement) {
        self.grid
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_cell(measurement);
    }

    fn on_row_completed(&self, row: usize, winner_col: Option<usize>, _totals: &[f64]) {
        let line = self
            .grid
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finish_row(row, winner_col);
        println!("{}", line);
    }

    fn on_race_completed(&self, winners: &[String], totals: &[f64]) {
        let line = self
            .grid
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .totals(winners, totals);
        println!("{}", line);
    }

    fn on_race_cancelled(&self, row: usize, col: usize) {
        println!("Race stopped at workload {}, strategy {}", row, col);
    }
}
