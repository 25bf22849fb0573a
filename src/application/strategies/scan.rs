use super::display_name::LazyName;
use crate::domain::errors::RunError;
use crate::domain::ports::QueryStrategy;
use crate::domain::sandbox::{Document, SimpleQuery};

/// Parses the query and tests every element in document order.
#[derive(Debug)]
pub struct ScanStrategy {
    name: LazyName,
}

impl ScanStrategy {
    pub const ID: &'static str = "scan";

    pub fn new() -> Self {
        Self {
            name: LazyName::of_type::<Self>(),
        }
    }
}

impl Default for ScanStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryStrategy<Document> for ScanStrategy {
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
            .iter()
            .filter(|element| query.matches(element))
            .count())
    }
}
