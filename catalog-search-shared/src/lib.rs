//! # Catalog Search Shared
//!
//! This crate defines the data structures shared across the catalog search
//! workspace: the `Indexable` contract that records implement to be fed into
//! the search index, the autocomplete document shape, and the small value
//! types (sort order, pagination, scored hits) used by queries and results.

pub mod types;

pub use types::autocomplete_document::AutoCompleteDocument;
pub use types::indexable::Indexable;
pub use types::search_query::{Pagination, SortOrder};
pub use types::search_result::ScoredDocument;
