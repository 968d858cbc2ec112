//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search engine calls,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;

/// Abstracts the underlying search engine (OpenSearch, Elasticsearch, etc.).
///
/// Implementations are shared behind an `Arc` by `SearchIndexService`,
/// `IndexAdmin` and `RecordIndex`, which keeps the request-building and
/// response-formatting logic independent of the transport and lets tests
/// substitute in-memory mocks.
///
/// Every method is a single blocking round trip to the engine. Transport
/// failures must be reported as `SearchIndexError::ConnectionError`.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Check whether the named index exists.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError>;

    /// Create the named index with the given `{ settings, mappings }` body.
    async fn create_index(&self, index: &str, body: &Value) -> Result<(), SearchIndexError>;

    /// Delete the named index.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the index was deleted
    /// * `Ok(false)` - If the index did not exist
    /// * `Err(SearchIndexError)` - If the deletion fails
    async fn delete_index(&self, index: &str) -> Result<bool, SearchIndexError>;

    /// Run a search request and return the raw response envelope.
    async fn search(&self, index: &str, body: &Value) -> Result<Value, SearchIndexError>;

    /// Fetch a single document's source by id.
    ///
    /// A missing document is `Ok(None)`, not an error.
    async fn get_document(&self, index: &str, id: &str) -> Result<Option<Value>, SearchIndexError>;

    /// Index (create or replace) a single document.
    ///
    /// When `id` is `None` the engine assigns an identifier.
    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        body: &Value,
    ) -> Result<(), SearchIndexError>;

    /// Delete a single document.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the document was deleted
    /// * `Ok(false)` - If the document did not exist
    /// * `Err(SearchIndexError)` - If the deletion fails
    async fn delete_document(&self, index: &str, id: &str) -> Result<bool, SearchIndexError>;

    /// Submit a flattened bulk operation list and return the raw bulk response.
    ///
    /// Per-item failures are part of the returned response; only a rejection of
    /// the request as a whole is an `Err`.
    async fn bulk(&self, index: &str, operations: Vec<Value>) -> Result<Value, SearchIndexError>;
}
