//! Prometheus metrics definitions for queryrace
//!
//! All metrics use the `queryrace_` prefix.

use prometheus::{
    CounterVec, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

/// Prometheus metrics for benchmark races
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Measured cells by strategy and status (ok / failed)
    pub cells_total: CounterVec,
    /// Average call duration per measured cell, in milliseconds
    pub cell_duration_ms: HistogramVec,
    /// Finalized rows
    pub rows_completed_total: IntCounter,
    /// Races by final status (completed / cancelled)
    pub races_completed_total: IntCounterVec,
    /// Wall time of one scheduler step, in seconds
    pub step_latency_seconds: Histogram,
}

impl Metrics {
    /// Create a new Metrics instance with every collector registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let cells_total = CounterVec::new(
            Opts::new("queryrace_cells_total", "Measured cells by strategy and status"),
            &["strategy", "status"],
        )?;
        registry.register(Box::new(cells_total.clone()))?;

        let cell_duration_ms = HistogramVec::new(
            HistogramOpts::new(
                "queryrace_cell_duration_ms",
                "Average call duration of a measured cell in milliseconds",
            )
            .buckets(vec![
                0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 50.0, 100.0, 500.0,
            ]),
            &["strategy"],
        )?;
        registry.register(Box::new(cell_duration_ms.clone()))?;

        let rows_completed_total = IntCounter::with_opts(Opts::new(
            "queryrace_rows_completed_total",
            "Workload rows finalized",
        ))?;
        registry.register(Box::new(rows_completed_total.clone()))?;

        let races_completed_total = IntCounterVec::new(
            Opts::new(
                "queryrace_races_completed_total",
                "Races that reached a terminal state",
            ),
            &["status"],
        )?;
        registry.register(Box::new(races_completed_total.clone()))?;

        let step_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "queryrace_step_latency_seconds",
                "Wall time of one scheduler step in seconds",
            )
            .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )?;
        registry.register(Box::new(step_latency_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            cells_total,
            cell_duration_ms,
            rows_completed_total,
            races_completed_total,
            step_latency_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn observe_cell(&self, strategy: &str, failed: bool, average_ms: f64) {
        let status = if failed { "failed" } else { "ok" };
        self.cells_total
            .with_label_values(&[strategy, status])
            .inc();
        if !failed {
            self.cell_duration_ms
                .with_label_values(&[strategy])
                .observe(average_ms);
        }
    }

    pub fn inc_races(&self, status: &str) {
        self.races_completed_total
            .with_label_values(&[status])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_line<'a>(output: &'a str, name: &str, labels: &[&str]) -> Option<&'a str> {
        output
            .lines()
            .find(|line| line.starts_with(name) && labels.iter().all(|l| line.contains(l)))
    }

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.rows_completed_total.inc();
        assert!(metrics.render().contains("queryrace_rows_completed_total 1"));
    }

    #[test]
    fn test_failed_cells_skip_duration_histogram() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.observe_cell("scan", false, 1.5);
        metrics.observe_cell("indexed", true, 200.0);

        let output = metrics.render();
        let ok = sample_line(
            &output,
            "queryrace_cells_total",
            &["status=\"ok\"", "strategy=\"scan\""],
        );
        let failed = sample_line(
            &output,
            "queryrace_cells_total",
            &["status=\"failed\"", "strategy=\"indexed\""],
        );
        assert!(ok.is_some_and(|line| line.ends_with(" 1")));
        assert!(failed.is_some_and(|line| line.ends_with(" 1")));
        assert!(sample_line(&output, "queryrace_cell_duration_ms_count", &["scan"]).is_some());
        assert!(sample_line(&output, "queryrace_cell_duration_ms_count", &["indexed"]).is_none());
    }

    #[test]
    fn test_race_counter_by_status() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_races("completed");
        metrics.inc_races("cancelled");
        metrics.inc_races("completed");

        let output = metrics.render();
        assert!(output.contains("queryrace_races_completed_total{status=\"completed\"} 2"));
        assert!(output.contains("queryrace_races_completed_total{status=\"cancelled\"} 1"));
    }
}
