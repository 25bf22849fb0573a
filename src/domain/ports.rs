use crate::domain::errors::RunError;
use std::time::Duration;

/// A pluggable query implementation being benchmarked.
///
/// `C` is the execution context the race hands to every call; the scheduler never
/// looks inside it.
pub trait QueryStrategy<C: ?Sized>: Send + Sync {
    /// Stable identifier, unique within a race.
    fn id(&self) -> &str;

    /// Human-readable name. Implementations may resolve it lazily and cache it.
    fn display_name(&self) -> &str {
        self.id()
    }

    /// Run `query_expression` against `context` and report how many matches were found.
    fn run(&self, query_expression: &str, context: &C) -> Result<usize, RunError>;
}

/// Monotonic time source used by the timing sampler.
pub trait Clock: Send + Sync {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}
