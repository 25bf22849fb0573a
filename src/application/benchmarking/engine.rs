use crate::application::benchmarking::ranking::RankingAggregator;
use crate::application::benchmarking::sampler::TimingSampler;
use crate::domain::errors::{ConfigError, SchedulerError};
use crate::domain::events::{ProgressReporter, RaceLineup};
use crate::domain::ports::{Clock, QueryStrategy};
use crate::domain::race::{ExecutionContexts, WorkloadCase};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

pub const DEFAULT_MINIMUM_DURATION_MS: u64 = 200;

/// Everything a race needs, supplied at `start()` and read-only afterwards.
pub struct RaceConfig<C: ?Sized> {
    pub minimum_duration_ms: u64,
    pub workloads: Vec<WorkloadCase>,
    pub strategies: Vec<Arc<dyn QueryStrategy<C>>>,
    pub contexts: ExecutionContexts<C>,
}

impl<C: ?Sized> RaceConfig<C> {
    pub fn new(
        workloads: Vec<WorkloadCase>,
        strategies: Vec<Arc<dyn QueryStrategy<C>>>,
        contexts: ExecutionContexts<C>,
    ) -> Self {
        Self {
            minimum_duration_ms: DEFAULT_MINIMUM_DURATION_MS,
            workloads,
            strategies,
            contexts,
        }
    }

    pub fn with_minimum_duration_ms(mut self, minimum_duration_ms: u64) -> Self {
        self.minimum_duration_ms = minimum_duration_ms;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.workloads.is_empty() {
            return Err(ConfigError::NoWorkloads);
        }
        if self.strategies.is_empty() {
            return Err(ConfigError::NoStrategies);
        }
        self.contexts.validate(self.strategies.len())
    }

    fn lineup(&self) -> RaceLineup {
        RaceLineup {
            workloads: self.workloads.clone(),
            strategy_ids: self.strategies.iter().map(|s| s.id().to_string()).collect(),
            strategy_names: self
                .strategies
                .iter()
                .map(|s| s.display_name().to_string())
                .collect(),
            minimum_duration_ms: self.minimum_duration_ms,
            shared_context: self.contexts.is_shared(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerState::Idle => write!(f, "Idle"),
            SchedulerState::Running => write!(f, "Running"),
            SchedulerState::Completed => write!(f, "Completed"),
            SchedulerState::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// What one bounded unit of scheduler work accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Continue,
    RowCompleted,
    RaceCompleted,
    Cancelled,
}

impl StepResult {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepResult::RaceCompleted | StepResult::Cancelled)
    }
}

/// Shared cancellation flag. Polled only at the top of `step()`.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Final state of a race that reached a terminal step.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceOutcome {
    pub state: SchedulerState,
    pub winners: Vec<String>,
    pub totals: Vec<f64>,
    pub rows_completed: usize,
}

struct RaceState<C: ?Sized> {
    config: RaceConfig<C>,
    row_index: usize,
    column_index: usize,
    ranking: RankingAggregator,
}

/// Drives the workload x strategy matrix one cell per `step()`.
///
/// The scheduler never runs on its own: the host calls `step()` whenever it has idle
/// capacity, and each call measures at most one cell or finalizes one row.
pub struct MatrixScheduler<C: ?Sized> {
    sampler: TimingSampler,
    reporter: Arc<dyn ProgressReporter>,
    state: SchedulerState,
    race: Option<RaceState<C>>,
    cancel: CancelHandle,
    outcome: Option<RaceOutcome>,
}

impl<C: ?Sized> MatrixScheduler<C> {
    pub fn new(reporter: Arc<dyn ProgressReporter>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sampler: TimingSampler::new(clock),
            reporter,
            state: SchedulerState::Idle,
            race: None,
            cancel: CancelHandle::default(),
            outcome: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Handle a host component can keep to request cancellation later.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Request cancellation. Takes effect on the next `step()`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Outcome of the last race that reached `Completed` or `Cancelled`.
    pub fn outcome(&self) -> Option<&RaceOutcome> {
        self.outcome.as_ref()
    }

    /// Next cell to be measured as `(row, column)`, while running.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.race
            .as_ref()
            .map(|race| (race.row_index, race.column_index))
    }

    pub fn totals(&self) -> Option<&[f64]> {
        self.race.as_ref().map(|race| race.ranking.totals())
    }

    /// Begin a fresh race. A finished or cancelled scheduler may be started again.
    pub fn start(&mut self, config: RaceConfig<C>) -> Result<(), SchedulerError> {
        if self.state == SchedulerState::Running {
            return Err(SchedulerError::AlreadyRunning);
        }
        config.validate()?;

        let lineup = config.lineup();
        info!(
            "MatrixScheduler: starting race ({} workloads x {} strategies, min {}ms, shared context: {})",
            lineup.rows(),
            lineup.columns(),
            config.minimum_duration_ms,
            lineup.shared_context
        );

        self.cancel.reset();
        self.outcome = None;
        self.race = Some(RaceState {
            ranking: RankingAggregator::new(config.strategies.len()),
            config,
            row_index: 0,
            column_index: 0,
        });
        self.state = SchedulerState::Running;
        self.reporter.on_race_started(&lineup);
        Ok(())
    }

    /// Perform one bounded unit of work.
    pub fn step(&mut self) -> Result<StepResult, SchedulerError> {
        let race = match (&self.state, self.race.as_mut()) {
            (SchedulerState::Running, Some(race)) => race,
            _ => {
                return Err(SchedulerError::NotRunning {
                    state: self.state.to_string(),
                });
            }
        };

        if self.cancel.is_cancelled() {
            warn!(
                "MatrixScheduler: race cancelled at row {}, column {}",
                race.row_index, race.column_index
            );
            self.reporter
                .on_race_cancelled(race.row_index, race.column_index);
            let outcome = RaceOutcome {
                state: SchedulerState::Cancelled,
                winners: Vec::new(),
                totals: race.ranking.totals().to_vec(),
                rows_completed: race.row_index,
            };
            self.finish(outcome);
            return Ok(StepResult::Cancelled);
        }

        let strategy_count = race.config.strategies.len();
        if race.column_index == strategy_count {
            let row = race.row_index;
            let winner = race.ranking.finish_row();
            info!(
                "MatrixScheduler: row {} ('{}') completed, winner: {}",
                row,
                race.config.workloads[row].id,
                winner
                    .map(|col| race.config.strategies[col].id())
                    .unwrap_or("none")
            );
            self.reporter
                .on_row_completed(row, winner, race.ranking.totals());

            race.column_index = 0;
            race.row_index += 1;
            if race.row_index < race.config.workloads.len() {
                return Ok(StepResult::RowCompleted);
            }

            let winners: Vec<String> = race
                .ranking
                .overall_winners()
                .into_iter()
                .map(|col| race.config.strategies[col].id().to_string())
                .collect();
            info!("MatrixScheduler: race completed, winner(s): {}", winners.join(", "));
            self.reporter
                .on_race_completed(&winners, race.ranking.totals());
            let outcome = RaceOutcome {
                state: SchedulerState::Completed,
                winners,
                totals: race.ranking.totals().to_vec(),
                rows_completed: race.row_index,
            };
            self.finish(outcome);
            return Ok(StepResult::RaceCompleted);
        }

        let (row, col) = (race.row_index, race.column_index);
        let workload = &race.config.workloads[row];
        let strategy = race.config.strategies[col].as_ref();
        let measurement = self.sampler.measure(
            strategy,
            &workload.query_expression,
            race.config.contexts.for_column(col),
            race.config.minimum_duration_ms,
        );
        debug!(
            "MatrixScheduler: [{}] x [{}] -> {} ({} samples)",
            workload.id,
            strategy.id(),
            measurement.cell_text(),
            measurement.sample_count
        );

        race.ranking.record(col, &measurement);
        self.reporter.on_cell(row, col, &measurement);
        race.column_index += 1;
        Ok(StepResult::Continue)
    }

    fn finish(&mut self, outcome: RaceOutcome) {
        self.state = outcome.state;
        self.outcome = Some(outcome);
        self.race = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::RunError;
    use crate::infrastructure::mock::{
        ManualClock, RecordedEvent, RecordingReporter, ScriptedStrategy,
    };

    fn scheduler(clock: &ManualClock, reporter: &RecordingReporter) -> MatrixScheduler<()> {
        MatrixScheduler::new(Arc::new(reporter.clone()), Arc::new(clock.clone()))
    }

    fn config(
        workloads: &[&str],
        strategies: Vec<Arc<dyn QueryStrategy<()>>>,
    ) -> RaceConfig<()> {
        let workloads = workloads
            .iter()
            .map(|q| WorkloadCase::new(*q, *q))
            .collect();
        RaceConfig::new(workloads, strategies, ExecutionContexts::shared(Arc::new(())))
    }

    #[test]
    fn test_start_rejects_empty_workloads() {
        let clock = ManualClock::new();
        let reporter = RecordingReporter::new();
        let mut sched = scheduler(&clock, &reporter);
        let a: Arc<dyn QueryStrategy<()>> = Arc::new(ScriptedStrategy::new("a", clock.clone(), 1));

        let err = sched.start(config(&[], vec![a])).unwrap_err();

        assert_eq!(err, SchedulerError::Config(ConfigError::NoWorkloads));
        assert_eq!(sched.state(), SchedulerState::Idle);
        assert!(reporter.events().is_empty());
    }

    #[test]
    fn test_start_rejects_empty_strategies() {
        let clock = ManualClock::new();
        let reporter = RecordingReporter::new();
        let mut sched = scheduler(&clock, &reporter);

        let err = sched.start(config(&["div"], vec![])).unwrap_err();

        assert_eq!(err, SchedulerError::Config(ConfigError::NoStrategies));
        assert_eq!(sched.state(), SchedulerState::Idle);
    }

    #[test]
    fn test_start_rejects_mismatched_contexts() {
        let clock = ManualClock::new();
        let reporter = RecordingReporter::new();
        let mut sched = scheduler(&clock, &reporter);
        let a: Arc<dyn QueryStrategy<()>> = Arc::new(ScriptedStrategy::new("a", clock.clone(), 1));
        let mut cfg = config(&["div"], vec![a]);
        cfg.contexts = ExecutionContexts::per_strategy(vec![]);

        let err = sched.start(cfg).unwrap_err();

        assert_eq!(
            err,
            SchedulerError::Config(ConfigError::ContextCountMismatch {
                expected: 1,
                actual: 0
            })
        );
    }

    #[test]
    fn test_step_before_start_is_an_error() {
        let clock = ManualClock::new();
        let reporter = RecordingReporter::new();
        let mut sched = scheduler(&clock, &reporter);

        assert!(matches!(
            sched.step(),
            Err(SchedulerError::NotRunning { .. })
        ));
    }

    #[test]
    fn test_step_sequence_for_two_by_two() {
        let clock = ManualClock::new();
        let reporter = RecordingReporter::new();
        let mut sched = scheduler(&clock, &reporter);
        let a: Arc<dyn QueryStrategy<()>> = Arc::new(ScriptedStrategy::new("a", clock.clone(), 10));
        let b: Arc<dyn QueryStrategy<()>> = Arc::new(ScriptedStrategy::new("b", clock.clone(), 5));
        sched.start(config(&["w1", "w2"], vec![a, b])).unwrap();

        let mut results = Vec::new();
        loop {
            let result = sched.step().unwrap();
            results.push(result);
            if result.is_terminal() {
                break;
            }
        }

        assert_eq!(
            results,
            vec![
                StepResult::Continue,
                StepResult::Continue,
                StepResult::RowCompleted,
                StepResult::Continue,
                StepResult::Continue,
                StepResult::RaceCompleted,
            ]
        );
        assert_eq!(sched.state(), SchedulerState::Completed);
        let outcome = sched.outcome().unwrap();
        assert_eq!(outcome.winners, vec!["b".to_string()]);
        assert_eq!(outcome.totals, vec![20.0, 10.0]);
        assert_eq!(outcome.rows_completed, 2);
        assert!(sched.position().is_none());
    }

    #[test]
    fn test_position_advances_row_major() {
        let clock = ManualClock::new();
        let reporter = RecordingReporter::new();
        let mut sched = scheduler(&clock, &reporter);
        let a: Arc<dyn QueryStrategy<()>> = Arc::new(ScriptedStrategy::new("a", clock.clone(), 300));
        let b: Arc<dyn QueryStrategy<()>> = Arc::new(ScriptedStrategy::new("b", clock.clone(), 300));
        sched.start(config(&["w1", "w2"], vec![a, b])).unwrap();

        assert_eq!(sched.position(), Some((0, 0)));
        sched.step().unwrap();
        assert_eq!(sched.position(), Some((0, 1)));
        sched.step().unwrap();
        assert_eq!(sched.position(), Some((0, 2)));
        sched.step().unwrap();
        assert_eq!(sched.position(), Some((1, 0)));
        assert_eq!(sched.totals(), Some(&[300.0, 300.0][..]));
    }

    #[test]
    fn test_cancel_takes_effect_on_next_step() {
        let clock = ManualClock::new();
        let reporter = RecordingReporter::new();
        let mut sched = scheduler(&clock, &reporter);
        let a: Arc<dyn QueryStrategy<()>> = Arc::new(ScriptedStrategy::new("a", clock.clone(), 300));
        sched.start(config(&["w1", "w2"], vec![a])).unwrap();
        sched.step().unwrap();

        sched.cancel();

        assert_eq!(sched.step().unwrap(), StepResult::Cancelled);
        assert_eq!(sched.state(), SchedulerState::Cancelled);
        assert!(sched.step().is_err());
        assert_eq!(reporter.cells().len(), 1);
        assert_eq!(
            reporter.events().last(),
            Some(&RecordedEvent::Cancelled { row: 0, col: 1 })
        );
    }

    #[test]
    fn test_cancel_handle_from_host() {
        let clock = ManualClock::new();
        let reporter = RecordingReporter::new();
        let mut sched = scheduler(&clock, &reporter);
        let handle = sched.cancel_handle();
        let a: Arc<dyn QueryStrategy<()>> = Arc::new(ScriptedStrategy::new("a", clock.clone(), 300));
        sched.start(config(&["w1"], vec![a])).unwrap();

        handle.cancel();

        assert_eq!(sched.step().unwrap(), StepResult::Cancelled);
        assert!(reporter.cells().is_empty());
        assert_eq!(sched.outcome().unwrap().state, SchedulerState::Cancelled);
    }

    #[test]
    fn test_restart_after_cancel_clears_flag() {
        let clock = ManualClock::new();
        let reporter = RecordingReporter::new();
        let mut sched = scheduler(&clock, &reporter);
        let a: Arc<dyn QueryStrategy<()>> = Arc::new(ScriptedStrategy::new("a", clock.clone(), 300));
        sched.start(config(&["w1"], vec![a.clone()])).unwrap();
        sched.cancel();
        sched.step().unwrap();

        sched.start(config(&["w1"], vec![a])).unwrap();

        assert_eq!(sched.state(), SchedulerState::Running);
        assert_eq!(sched.step().unwrap(), StepResult::Continue);
    }

    #[test]
    fn test_start_while_running_is_rejected() {
        let clock = ManualClock::new();
        let reporter = RecordingReporter::new();
        let mut sched = scheduler(&clock, &reporter);
        let a: Arc<dyn QueryStrategy<()>> = Arc::new(ScriptedStrategy::new("a", clock.clone(), 300));
        sched.start(config(&["w1"], vec![a.clone()])).unwrap();

        assert_eq!(
            sched.start(config(&["w1"], vec![a])),
            Err(SchedulerError::AlreadyRunning)
        );
    }

    #[test]
    fn test_per_strategy_contexts_are_routed_by_column() {
        struct EchoContext;
        impl QueryStrategy<usize> for EchoContext {
            fn id(&self) -> &str {
                "echo"
            }
            fn run(&self, _query: &str, context: &usize) -> Result<usize, RunError> {
                Ok(*context)
            }
        }

        let clock = ManualClock::new();
        let reporter = RecordingReporter::new();
        let mut sched: MatrixScheduler<usize> =
            MatrixScheduler::new(Arc::new(reporter.clone()), Arc::new(clock.clone()));
        let strategies: Vec<Arc<dyn QueryStrategy<usize>>> =
            vec![Arc::new(EchoContext), Arc::new(EchoContext)];
        let cfg = RaceConfig::new(
            vec![WorkloadCase::new("w1", "div")],
            strategies,
            ExecutionContexts::per_strategy(vec![Arc::new(11), Arc::new(22)]),
        )
        .with_minimum_duration_ms(0);
        sched.start(cfg).unwrap();

        sched.step().unwrap();
        sched.step().unwrap();

        let counts: Vec<i64> = reporter
            .cells()
            .iter()
            .map(|(_, _, m)| m.result_count)
            .collect();
        assert_eq!(counts, vec![11, 22]);
    }
}
