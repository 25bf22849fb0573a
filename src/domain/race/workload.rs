use serde::{Deserialize, Serialize};

/// One fixed query input that every strategy in a race is measured against.
///
/// Workloads are immutable once a race starts; their order defines row order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadCase {
    pub id: String,
    #[serde(rename = "query")]
    pub query_expression: String,
}

impl WorkloadCase {
    pub fn new(id: impl Into<String>, query_expression: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            query_expression: query_expression.into(),
        }
    }
}
