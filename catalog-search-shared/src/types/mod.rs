//! This module defines the core data structures shared by the catalog search crates.
//! It re-exports the indexable contract and document types.

pub mod autocomplete_document;
pub mod indexable;
pub mod search_query;
pub mod search_result;

pub use autocomplete_document::AutoCompleteDocument;
pub use indexable::Indexable;
pub use search_query::{Pagination, SortOrder};
pub use search_result::ScoredDocument;
