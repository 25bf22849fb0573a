use crate::domain::errors::ConfigError;
use std::sync::Arc;

/// Execution contexts handed, unmodified, to every strategy call.
///
/// `Shared` gives every strategy the same handle; `PerStrategy` isolates each
/// strategy column in its own handle so one strategy cannot disturb another's sandbox.
pub enum ExecutionContexts<C: ?Sized> {
    Shared(Arc<C>),
    PerStrategy(Vec<Arc<C>>),
}

impl<C: ?Sized> ExecutionContexts<C> {
    pub fn shared(context: Arc<C>) -> Self {
        ExecutionContexts::Shared(context)
    }

    pub fn per_strategy(contexts: Vec<Arc<C>>) -> Self {
        ExecutionContexts::PerStrategy(contexts)
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, ExecutionContexts::Shared(_))
    }

    /// Check the context list against the number of strategy columns.
    pub fn validate(&self, strategy_count: usize) -> Result<(), ConfigError> {
        match self {
            ExecutionContexts::Shared(_) => Ok(()),
            ExecutionContexts::PerStrategy(contexts) if contexts.len() == strategy_count => Ok(()),
            ExecutionContexts::PerStrategy(contexts) => Err(ConfigError::ContextCountMismatch {
                expected: strategy_count,
                actual: contexts.len(),
            }),
        }
    }

    /// Context for strategy column `column`. Only valid after `validate`.
    pub fn for_column(&self, column: usize) -> &C {
        match self {
            ExecutionContexts::Shared(context) => context,
            ExecutionContexts::PerStrategy(contexts) => &contexts[column],
        }
    }
}

impl<C: ?Sized> Clone for ExecutionContexts<C> {
    fn clone(&self) -> Self {
        match self {
            ExecutionContexts::Shared(context) => ExecutionContexts::Shared(Arc::clone(context)),
            ExecutionContexts::PerStrategy(contexts) => {
                ExecutionContexts::PerStrategy(contexts.iter().map(Arc::clone).collect())
            }
        }
    }
}
