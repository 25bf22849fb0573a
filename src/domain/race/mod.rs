pub mod context;
pub mod measurement;
pub mod workload;

pub use context::ExecutionContexts;
pub use measurement::{FAILED_RESULT_COUNT, Measurement, MeasurementStatus, format_total};
pub use workload::WorkloadCase;
