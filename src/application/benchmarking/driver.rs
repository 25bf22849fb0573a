//! Host-side loops that keep calling `step()` until a race is over.

use crate::application::benchmarking::engine::{MatrixScheduler, RaceOutcome, StepResult};
use crate::domain::errors::SchedulerError;
use crate::infrastructure::observability::StepTimer;
use prometheus::Histogram;

/// Optional hook observing each step's latency.
pub type StepObserver = Option<Histogram>;

fn finished<C: ?Sized>(scheduler: &MatrixScheduler<C>) -> Result<RaceOutcome, SchedulerError> {
    scheduler
        .outcome()
        .cloned()
        .ok_or_else(|| SchedulerError::NotRunning {
            state: scheduler.state().to_string(),
        })
}

fn timed_step<C: ?Sized>(
    scheduler: &mut MatrixScheduler<C>,
    observer: &StepObserver,
) -> Result<StepResult, SchedulerError> {
    let _timer = observer.as_ref().map(StepTimer::start);
    scheduler.step()
}

/// Run the race to a terminal state without yielding.
pub fn drive_to_end<C: ?Sized>(
    scheduler: &mut MatrixScheduler<C>,
) -> Result<RaceOutcome, SchedulerError> {
    drive_to_end_observed(scheduler, &None)
}

pub fn drive_to_end_observed<C: ?Sized>(
    scheduler: &mut MatrixScheduler<C>,
    observer: &StepObserver,
) -> Result<RaceOutcome, SchedulerError> {
    while !timed_step(scheduler, observer)?.is_terminal() {}
    finished(scheduler)
}

/// Run the race, yielding to the tokio runtime between steps so other tasks
/// (rendering, signal handling) get serviced.
pub async fn drive_cooperatively<C: ?Sized>(
    scheduler: &mut MatrixScheduler<C>,
    observer: &StepObserver,
) -> Result<RaceOutcome, SchedulerError> {
    while !timed_step(scheduler, observer)?.is_terminal() {
        tokio::task::yield_now().await;
    }
    finished(scheduler)
}
