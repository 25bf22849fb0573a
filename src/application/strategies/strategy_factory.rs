use super::{IndexedStrategy, ParallelScanStrategy, ScanStrategy};
use crate::domain::errors::ConfigError;
use crate::domain::ports::QueryStrategy;
use crate::domain::sandbox::Document;
use crate::infrastructure::remote_runner::RemoteStrategy;
use std::sync::Arc;

/// Strategies pre-selected when the caller does not name any.
pub const DEFAULT_STRATEGIES: [&str; 3] = ["scan", "indexed", "parallel"];

type StrategyFactory<C> =
    Box<dyn Fn() -> Result<Arc<dyn QueryStrategy<C>>, ConfigError> + Send + Sync>;

struct RegistryEntry<C: ?Sized> {
    id: String,
    summary: String,
    factory: StrategyFactory<C>,
}

/// Maps strategy ids to factories, in registration order.
///
/// Factories run when a race is set up, so a strategy that needs its own resources
/// (a runner thread, a cache) only pays for them when it is actually selected.
/// Each entry also carries a one-line summary that can be shown without building it.
pub struct StrategyRegistry<C: ?Sized> {
    entries: Vec<RegistryEntry<C>>,
    defaults: Vec<String>,
}

impl<C: ?Sized> StrategyRegistry<C> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            defaults: Vec::new(),
        }
    }

    pub fn register<F>(&mut self, id: &str, summary: &str, factory: F) -> Result<(), ConfigError>
    where
        F: Fn() -> Result<Arc<dyn QueryStrategy<C>>, ConfigError> + Send + Sync + 'static,
    {
        if self.contains(id) {
            return Err(ConfigError::DuplicateStrategy { id: id.to_string() });
        }
        self.entries.push(RegistryEntry {
            id: id.to_string(),
            summary: summary.to_string(),
            factory: Box::new(factory),
        });
        Ok(())
    }

    /// Set the default selection. Ids that are not registered are ignored at resolve time.
    pub fn with_defaults<S: AsRef<str>>(mut self, ids: &[S]) -> Self {
        self.defaults = ids.iter().map(|id| id.as_ref().to_string()).collect();
        self
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.id.as_str()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Summary given at registration. Does not run the factory.
    pub fn summary(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.summary.as_str())
    }

    pub fn is_default(&self, id: &str) -> bool {
        self.defaults.iter().any(|d| d == id)
    }

    pub fn create(&self, id: &str) -> Result<Arc<dyn QueryStrategy<C>>, ConfigError> {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| ConfigError::UnknownStrategy { id: id.to_string() })?;
        (entry.factory)()
    }

    /// Resolve `ids` in the given order.
    pub fn select<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Vec<Arc<dyn QueryStrategy<C>>>, ConfigError> {
        ids.iter().map(|id| self.create(id.as_ref())).collect()
    }

    /// Resolve the default selection, in registration order.
    pub fn defaults(&self) -> Result<Vec<Arc<dyn QueryStrategy<C>>>, ConfigError> {
        let ids: Vec<&str> = self
            .ids()
            .into_iter()
            .filter(|id| self.is_default(id))
            .collect();
        self.select(ids.as_slice())
    }
}

impl<C: ?Sized> Default for StrategyRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

fn local<S>(make: fn() -> S) -> StrategyFactory<Document>
where
    S: QueryStrategy<Document> + 'static,
{
    Box::new(move || Ok(Arc::new(make()) as Arc<dyn QueryStrategy<Document>>))
}

impl StrategyRegistry<Document> {
    /// Registry of the bundled sandbox strategies.
    ///
    /// `remote_scan` runs the scan strategy on a dedicated runner thread that owns its
    /// own document. That document is generated from `document_size` and `document_seed`,
    /// the same parameters the race uses for its execution contexts, so every strategy
    /// queries the same elements.
    pub fn builtin(document_size: usize, document_seed: u64) -> Self {
        let remote: StrategyFactory<Document> = Box::new(move || {
            let document = Document::generate(document_size, document_seed);
            let strategy =
                RemoteStrategy::spawn(RemoteStrategy::SCAN_ID, document, ScanStrategy::new())?;
            Ok(Arc::new(strategy) as Arc<dyn QueryStrategy<Document>>)
        });

        let entries = vec![
            (ScanStrategy::ID, "Linear scan", local(ScanStrategy::new)),
            (IndexedStrategy::ID, "Indexed lookup", local(IndexedStrategy::new)),
            (
                ParallelScanStrategy::ID,
                "Parallel scan on the rayon pool",
                local(ParallelScanStrategy::new),
            ),
            (RemoteStrategy::SCAN_ID, "Linear scan on a runner thread", remote),
        ];

        let mut registry = StrategyRegistry::new();
        registry.entries = entries
            .into_iter()
            .map(|(id, summary, factory)| RegistryEntry {
                id: id.to_string(),
                summary: summary.to_string(),
                factory,
            })
            .collect();
        registry.with_defaults(&DEFAULT_STRATEGIES)
    }
}
