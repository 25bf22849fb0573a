use crate::domain::ports::{Clock, QueryStrategy};
use crate::domain::race::Measurement;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Smallest duration charged for a failed cell. Keeps failures from adding zero to a
/// running total when the minimum duration is zero.
pub const FAILURE_FLOOR_MS: u64 = 1;

/// Runs one strategy against one query until the minimum duration has elapsed.
///
/// The loop always executes at least once. A strategy error aborts sampling
/// immediately and yields a failed measurement whose duration is the minimum
/// duration itself (never below `FAILURE_FLOOR_MS`), so a broken cell never
/// takes the race down.
pub struct TimingSampler {
    clock: Arc<dyn Clock>,
}

impl TimingSampler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn measure<C: ?Sized>(
        &self,
        strategy: &dyn QueryStrategy<C>,
        query_expression: &str,
        context: &C,
        minimum_duration_ms: u64,
    ) -> Measurement {
        let minimum = Duration::from_millis(minimum_duration_ms);
        let start = self.clock.now();
        let mut calls: u64 = 0;

        loop {
            let found = match strategy.run(query_expression, context) {
                Ok(found) => found,
                Err(err) => {
                    warn!(
                        "Sampler: {} failed on '{}' after {} calls: {}",
                        strategy.id(),
                        query_expression,
                        calls,
                        err
                    );
                    let fallback = minimum_duration_ms.max(FAILURE_FLOOR_MS);
                    return Measurement::failed(fallback as f64, calls + 1);
                }
            };
            calls += 1;

            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= minimum {
                let elapsed_ms = elapsed.as_nanos() as f64 / 1_000_000.0;
                return Measurement::succeeded(elapsed_ms, calls, found);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::RunError;
    use crate::domain::race::{FAILED_RESULT_COUNT, MeasurementStatus};
    use crate::infrastructure::mock::{ManualClock, ScriptedStrategy};

    #[test]
    fn test_averages_many_fast_calls() {
        let clock = ManualClock::new();
        let sampler = TimingSampler::new(Arc::new(clock.clone()));
        let strategy = ScriptedStrategy::new("fast", clock, 10).with_result_count(4);

        let m = sampler.measure::<()>(&strategy, "div", &(), 200);

        assert_eq!(m.sample_count, 20);
        assert_eq!(m.average_duration_ms, 10.0);
        assert_eq!(m.result_count, 4);
        assert_eq!(m.status, MeasurementStatus::Ok);
    }

    #[test]
    fn test_single_slow_call_is_one_sample() {
        let clock = ManualClock::new();
        let sampler = TimingSampler::new(Arc::new(clock.clone()));
        let strategy = ScriptedStrategy::new("slow", clock, 250);

        let m = sampler.measure::<()>(&strategy, "div", &(), 200);

        assert_eq!(m.sample_count, 1);
        assert_eq!(m.average_duration_ms, 250.0);
    }

    #[test]
    fn test_zero_minimum_runs_once() {
        let clock = ManualClock::new();
        let sampler = TimingSampler::new(Arc::new(clock.clone()));
        let strategy = ScriptedStrategy::new("instant", clock, 0);

        let m = sampler.measure::<()>(&strategy, "div", &(), 0);

        assert_eq!(m.sample_count, 1);
        assert_eq!(strategy.calls(), 1);
    }

    #[test]
    fn test_failure_aborts_without_retry() {
        let clock = ManualClock::new();
        let sampler = TimingSampler::new(Arc::new(clock.clone()));
        let strategy = ScriptedStrategy::new("broken", clock, 10)
            .failing_on("div p", RunError::unsupported("div p", "combinator"));

        let m = sampler.measure::<()>(&strategy, "div p", &(), 200);

        assert_eq!(strategy.calls(), 1);
        assert_eq!(m.status, MeasurementStatus::Failed);
        assert_eq!(m.result_count, FAILED_RESULT_COUNT);
        assert_eq!(m.average_duration_ms, 200.0);
    }

    #[test]
    fn test_failure_after_successes_discards_partial_timing() {
        let clock = ManualClock::new();
        let sampler = TimingSampler::new(Arc::new(clock.clone()));
        let strategy = ScriptedStrategy::new("flaky", clock, 10).failing_after(3);

        let m = sampler.measure::<()>(&strategy, "div", &(), 200);

        assert_eq!(strategy.calls(), 4);
        assert_eq!(m.sample_count, 4);
        assert!(m.is_failed());
        assert_eq!(m.average_duration_ms, 200.0);
    }

    #[test]
    fn test_failure_with_zero_minimum_still_costs_time() {
        let clock = ManualClock::new();
        let sampler = TimingSampler::new(Arc::new(clock.clone()));
        let strategy = ScriptedStrategy::new("broken", clock, 0)
            .failing_on("div p", RunError::unsupported("div p", "combinator"));

        let m = sampler.measure::<()>(&strategy, "div p", &(), 0);

        assert!(m.is_failed());
        assert_eq!(m.average_duration_ms, FAILURE_FLOOR_MS as f64);
    }
}
