use thiserror::Error;

/// Errors that prevent a race from starting. The scheduler stays in its previous state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Race needs at least one workload case")]
    NoWorkloads,

    #[error("Race needs at least one strategy")]
    NoStrategies,

    #[error("Per-strategy execution contexts: expected {expected}, got {actual}")]
    ContextCountMismatch { expected: usize, actual: usize },

    #[error("Unknown strategy: {id}")]
    UnknownStrategy { id: String },

    #[error("Strategy registered twice: {id}")]
    DuplicateStrategy { id: String },

    #[error("Strategy {id} could not be created: {reason}")]
    StrategyUnavailable { id: String, reason: String },
}

/// A single strategy call failed. Absorbed by the sampler into a failed measurement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("Unsupported expression '{expression}': {reason}")]
    Unsupported { expression: String, reason: String },

    #[error("Invalid expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("Strategy fault: {message}")]
    Fault { message: String },

    #[error("Remote runner failed: {message}")]
    Remote { message: String },
}

impl RunError {
    pub fn unsupported(expression: &str, reason: impl Into<String>) -> Self {
        RunError::Unsupported {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid(expression: &str, reason: impl Into<String>) -> Self {
        RunError::InvalidExpression {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by the matrix scheduler itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Scheduler is not running (state: {state})")]
    NotRunning { state: String },

    #[error("A race is already running")]
    AlreadyRunning,
}
