use serde::{Deserialize, Serialize};

/// Result count reported for a cell whose strategy failed.
pub const FAILED_RESULT_COUNT: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasurementStatus {
    Ok,
    Failed,
}

/// Timing of one strategy against one workload case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub average_duration_ms: f64,
    pub sample_count: u64,
    pub result_count: i64,
    pub status: MeasurementStatus,
}

impl Measurement {
    /// Average `elapsed_ms` over `sample_count` calls. A count of zero is clamped to one.
    pub fn succeeded(elapsed_ms: f64, sample_count: u64, result_count: usize) -> Self {
        let sample_count = sample_count.max(1);
        Self {
            average_duration_ms: elapsed_ms / sample_count as f64,
            sample_count,
            result_count: i64::try_from(result_count).unwrap_or(i64::MAX),
            status: MeasurementStatus::Ok,
        }
    }

    /// Failed cell: the duration falls back to `fallback_ms` so the row keeps rendering.
    pub fn failed(fallback_ms: f64, attempts: u64) -> Self {
        Self {
            average_duration_ms: fallback_ms,
            sample_count: attempts.max(1),
            result_count: FAILED_RESULT_COUNT,
            status: MeasurementStatus::Failed,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == MeasurementStatus::Failed
    }

    /// Grid text: `Error`, or the average truncated to a tenth of a millisecond plus the count.
    pub fn cell_text(&self) -> String {
        if self.is_failed() {
            return "Error".to_string();
        }
        let truncated = (self.average_duration_ms * 10.0).trunc() / 10.0;
        format!("{:.1} ms | {} found", truncated, self.result_count)
    }
}

/// Running total truncated to a hundredth of a millisecond.
pub fn format_total(total_ms: f64) -> String {
    let truncated = (total_ms * 100.0).trunc() / 100.0;
    format!("{:.2} ms", truncated)
}
