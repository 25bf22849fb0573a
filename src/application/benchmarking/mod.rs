pub mod driver;
pub mod engine;
pub mod ranking;
pub mod reporting;
pub mod sampler;
pub mod track;

pub use driver::{StepObserver, drive_cooperatively, drive_to_end, drive_to_end_observed};
pub use engine::{
    CancelHandle, DEFAULT_MINIMUM_DURATION_MS, MatrixScheduler, RaceConfig, RaceOutcome,
    SchedulerState, StepResult,
};
pub use ranking::RankingAggregator;
pub use reporting::{RaceReport, RaceReportWriter, RaceStatus, ReportCollector};
pub use sampler::TimingSampler;
pub use track::RaceTrack;
