//! Deterministic test doubles: a manually advanced clock, strategies with scripted
//! per-call costs, and a reporter that records every event.

use crate::domain::errors::RunError;
use crate::domain::events::{ProgressReporter, RaceLineup};
use crate::domain::ports::{Clock, QueryStrategy};
use crate::domain::race::Measurement;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// Strategy whose every call advances a `ManualClock` by a scripted cost.
pub struct ScriptedStrategy {
    id: String,
    clock: ManualClock,
    cost_ms: u64,
    costs: HashMap<String, u64>,
    failures: HashMap<String, RunError>,
    fail_after: Option<u64>,
    result_count: usize,
    calls: AtomicU64,
}

impl ScriptedStrategy {
    pub fn new(id: &str, clock: ManualClock, cost_ms: u64) -> Self {
        Self {
            id: id.to_string(),
            clock,
            cost_ms,
            costs: HashMap::new(),
            failures: HashMap::new(),
            fail_after: None,
            result_count: 0,
            calls: AtomicU64::new(0),
        }
    }

    /// Use `cost_ms` per call for `expression` instead of the default cost.
    pub fn with_cost_for(mut self, expression: &str, cost_ms: u64) -> Self {
        self.costs.insert(expression.to_string(), cost_ms);
        self
    }

    pub fn with_result_count(mut self, result_count: usize) -> Self {
        self.result_count = result_count;
        self
    }

    /// Every call on `expression` fails with `error`.
    pub fn failing_on(mut self, expression: &str, error: RunError) -> Self {
        self.failures.insert(expression.to_string(), error);
        self
    }

    /// The first `successes` calls succeed, every later call fails.
    pub fn failing_after(mut self, successes: u64) -> Self {
        self.fail_after = Some(successes);
        self
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<C: ?Sized> QueryStrategy<C> for ScriptedStrategy {
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, query_expression: &str, _context: &C) -> Result<usize, RunError> {
        let previous = self.calls.fetch_add(1, Ordering::SeqCst);
        let cost = self
            .costs
            .get(query_expression)
            .copied()
            .unwrap_or(self.cost_ms);
        self.clock.advance_ms(cost);

        if let Some(error) = self.failures.get(query_expression) {
            return Err(error.clone());
        }
        if self.fail_after.is_some_and(|successes| previous >= successes) {
            return Err(RunError::Fault {
                message: format!("{} gave up after {} calls", self.id, previous),
            });
        }
        Ok(self.result_count)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedEvent {
    Started(RaceLineup),
    Cell {
        row: usize,
        col: usize,
        measurement: Measurement,
    },
    RowCompleted {
        row: usize,
        winner: Option<usize>,
        totals: Vec<f64>,
    },
    RaceCompleted {
        winners: Vec<String>,
        totals: Vec<f64>,
    },
    Cancelled {
        row: usize,
        col: usize,
    },
}

/// Reporter that keeps every event in order. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, Vec<RecordedEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.log().clone()
    }

    pub fn cells(&self) -> Vec<(usize, usize, Measurement)> {
        self.log()
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::Cell {
                    row,
                    col,
                    measurement,
                } => Some((*row, *col, measurement.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn rows(&self) -> Vec<(usize, Option<usize>, Vec<f64>)> {
        self.log()
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::RowCompleted {
                    row,
                    winner,
                    totals,
                } => Some((*row, *winner, totals.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn completions(&self) -> Vec<(Vec<String>, Vec<f64>)> {
        self.log()
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::RaceCompleted { winners, totals } => {
                    Some((winners.clone(), totals.clone()))
                }
                _ => None,
            })
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn on_race_started(&self, lineup: &RaceLineup) {
        self.log().push(RecordedEvent::Started(lineup.clone()));
    }

    fn on_cell(&self, row: usize, col: usize, measurement: &Measurement) {
        self.log().push(RecordedEvent::Cell {
            row,
            col,
            measurement: measurement.clone(),
        });
    }

    fn on_row_completed(&self, row: usize, winner_col: Option<usize>, totals: &[f64]) {
        self.log().push(RecordedEvent::RowCompleted {
            row,
            winner: winner_col,
            totals: totals.to_vec(),
        });
    }

    fn on_race_completed(&self, winners: &[String], totals: &[f64]) {
        self.log().push(RecordedEvent::RaceCompleted {
            winners: winners.to_vec(),
            totals: totals.to_vec(),
        });
    }

    fn on_race_cancelled(&self, row: usize, col: usize) {
        self.log().push(RecordedEvent::Cancelled { row, col });
    }
}
