use super::display_name::LazyName;
use crate::domain::errors::RunError;
use crate::domain::ports::QueryStrategy;
use crate::domain::sandbox::{Document, SimpleQuery};
use rayon::prelude::*;

/// Linear scan split across the rayon thread pool.
#[derive(Debug)]
pub struct ParallelScanStrategy {
    name: LazyName,
}

impl ParallelScanStrategy {
    pub const ID: &'static str = "parallel";

    pub fn new() -> Self {
        Self {
            name: LazyName::new(|| {
                format!(
                    "Parallel scan [{} threads]",
                    rayon::current_num_threads()
                )
            }),
        }
    }
}

impl Default for ParallelScanStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryStrategy<Document> for ParallelScanStrategy {
    fn id(&self) -> &str {
        Self::ID
    }

    fn display_name(&self) -> &str {
        self.name.get()
    }

    fn run(&self, query_expression: &str, document: &Document) -> Result<usize, RunError> {
        let query = SimpleQuery::parse(query_expression)?;
        Ok(document
            .elements()
            .par_iter()
            .filter(|element| query.matches(element))
            .count())
    }
}
