pub mod clock;
pub mod event_bus;
pub mod mock;
pub mod observability;
pub mod remote_runner;
pub mod workload_suite;

pub use clock::SystemClock;
pub use event_bus::ProgressBus;
pub use remote_runner::{RemoteRunner, RemoteStrategy};
pub use workload_suite::{default_workloads, load_workload_suite, parse_workload_suite};
