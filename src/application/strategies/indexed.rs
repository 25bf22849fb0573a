use super::display_name::LazyName;
use crate::domain::errors::RunError;
use crate::domain::ports::QueryStrategy;
use crate::domain::sandbox::{Document, SimpleQuery};

/// Looks up candidates in the document index, then filters them.
///
/// Candidates come from the most selective part present: id, then first class, then tag.
/// Selector groups are rejected.
#[derive(Debug)]
pub struct IndexedStrategy {
    name: LazyName,
}

impl IndexedStrategy {
    pub const ID: &'static str = "indexed";

    pub fn new() -> Self {
        Self {
            name: LazyName::new(|| "Indexed lookup".to_string()),
        }
    }
}

impl Default for IndexedStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryStrategy<Document> for IndexedStrategy {
    fn id(&self) -> &str {
        Self::ID
    }

    fn display_name(&self) -> &str {
        self.name.get()
    }

    fn run(&self, query_expression: &str, document: &Document) -> Result<usize, RunError> {
        let query = SimpleQuery::parse(query_expression)?;
        if query.is_group() {
            return Err(RunError::unsupported(
                query_expression,
                "selector groups cannot use a single index",
            ));
        }
        let selector = &query.groups[0];
        let index = document.index();

        let candidates = if let Some(id) = &selector.id {
            index.id(id)
        } else if let Some(class) = selector.classes.first() {
            index.class(class)
        } else if let Some(tag) = &selector.tag {
            index.tag(tag)
        } else {
            return Ok(document.len());
        };

        let elements = document.elements();
        Ok(candidates
            .iter()
            .filter(|pos| selector.matches(&elements[**pos]))
            .count())
    }
}
