//! # Catalog Search
//!
//! Feeds application records into an OpenSearch index and serves title
//! lookups and autocomplete suggestions from it.
//!
//! ## Architecture
//!
//! 1. **Source**: Reads records in chunks (in memory or from a JSON-lines export)
//! 2. **Feeder**: Drops and recreates the index, then bulk-loads every chunk
//! 3. **Facade**: `look_for` / `auto_complete` over the fed index
//!
//! ## Modules
//!
//! - [`config`]: Settings and dependency initialization
//! - [`source`]: Data sources for the feeder
//! - [`feeder`]: Full reindex
//! - [`facade`]: Lookup entry points
//! - [`errors`]: Error types for feeding

pub mod config;
pub mod errors;
pub mod facade;
pub mod feeder;
pub mod source;

pub use config::{Dependencies, Settings};
pub use errors::FeedError;
pub use facade::{FacadeConfig, SearchFacade};
pub use feeder::{Feeder, FeederConfig, FeederState, ReindexReport};
pub use source::{DataSource, JsonLinesSource, VecSource};

use catalog_search_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur during initialization or execution.
#[derive(Error, Debug)]
pub enum CatalogSearchError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Feed error.
    #[error("Feed error: {0}")]
    FeedError(#[from] FeedError),

    /// Search engine error.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchIndexError),
}

impl CatalogSearchError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
