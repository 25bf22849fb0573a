//! In-process sandbox the bundled strategies query: a flat element document and a
//! small compound-selector language.

pub mod document;
pub mod query;

pub use document::{Document, DocumentIndex, Element};
pub use query::{CompoundSelector, SimpleQuery};
