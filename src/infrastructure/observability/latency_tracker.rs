//! Wall-clock latency of one scheduler `step()`.
//!
//! Hosts budget their idle time around a single step, so the histogram fed here is
//! the number to watch when a cell runs long.

use prometheus::Histogram;
use std::time::Instant;

/// Times one step and observes it, in seconds, when dropped.
pub struct StepTimer<'a> {
    started: Instant,
    histogram: &'a Histogram,
}

impl<'a> StepTimer<'a> {
    pub fn start(histogram: &'a Histogram) -> Self {
        Self {
            started: Instant::now(),
            histogram,
        }
    }
}

impl Drop for StepTimer<'_> {
    fn drop(&mut self) {
        self.histogram.observe(self.started.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::HistogramOpts;

    #[test]
    fn test_step_timer_observes_elapsed_seconds() {
        let histogram =
            Histogram::with_opts(HistogramOpts::new("test_step_latency", "test")).unwrap();

        {
            let _timer = StepTimer::start(&histogram);
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        assert!(histogram.get_sample_sum() >= 0.01);
        assert_eq!(histogram.get_sample_count(), 1);
    }

    #[test]
    fn test_one_sample_per_step() {
        let histogram =
            Histogram::with_opts(HistogramOpts::new("test_step_count", "test")).unwrap();

        for _ in 0..3 {
            let _timer = StepTimer::start(&histogram);
        }

        assert_eq!(histogram.get_sample_count(), 3);
    }
}
