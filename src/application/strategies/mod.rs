mod display_name;
mod indexed;
mod parallel;
mod scan;
pub mod strategy_factory;

pub use display_name::LazyName;
pub use indexed::IndexedStrategy;
pub use parallel::ParallelScanStrategy;
pub use scan::ScanStrategy;
pub use strategy_factory::{DEFAULT_STRATEGIES, StrategyRegistry};
