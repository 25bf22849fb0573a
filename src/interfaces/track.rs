//! Text rendering of the race track.

use crate::application::benchmarking::RaceTrack;
use crate::domain::events::{ProgressReporter, RaceLineup};
use crate::domain::race::Measurement;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone)]
struct Field {
    track: RaceTrack,
    strategy_ids: Vec<String>,
}

/// Renders one line per strategy: padded id, a `=` trail and the `>` horse.
pub fn render_track(
    track: &RaceTrack,
    ids: &[String],
    rows_done: usize,
    totals: &[f64],
) -> Vec<String> {
    let label_width = ids.iter().map(String::len).max().unwrap_or(0);
    track
        .positions(rows_done, totals)
        .iter()
        .zip(ids)
        .map(|(position, id)| {
            let trail = position.round().max(0.0) as usize;
            format!("{:<width$} |{}>", id, "=".repeat(trail), width = label_width)
        })
        .collect()
}

/// Prints the race track after every row and flags the winners at the end.
pub struct TrackReporter {
    width: usize,
    field: Mutex<Option<Field>>,
}

impl TrackReporter {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            field: Mutex::new(None),
        }
    }

    fn field(&self) -> Option<Field> {
        self.field
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProgressReporter for TrackReporter {
    fn on_race_started(&self, lineup: &RaceLineup) {
        *self.field.lock().unwrap_or_else(PoisonError::into_inner) = Some(Field {
            track: RaceTrack::new(self.width as f64, lineup.rows()),
            strategy_ids: lineup.strategy_ids.clone(),
        });
    }

    fn on_cell(&self, _row: usize, _col: usize, _measurement: &Measurement) {}

    fn on_row_completed(&self, row: usize, _winner_col: Option<usize>, totals: &[f64]) {
        if let Some(field) = self.field() {
            for line in render_track(&field.track, &field.strategy_ids, row + 1, totals) {
                println!("{}", line);
            }
            println!();
        }
    }

    fn on_race_completed(&self, winners: &[String], _totals: &[f64]) {
        println!("Finish line: {}", winners.join(", "));
    }
}
