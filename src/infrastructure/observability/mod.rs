//! Pull-free observability for queryrace
//!
//! Metrics are kept in a private Prometheus registry fed by the race's progress
//! events. Nothing is served over the network: the binary prints the text
//! exposition once a race is over.

pub mod latency_tracker;
pub mod metrics;
pub mod reporter;

pub use latency_tracker::StepTimer;
pub use metrics::Metrics;
pub use reporter::MetricsReporter;
