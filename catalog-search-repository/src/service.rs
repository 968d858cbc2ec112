//! Search index service implementation.
//!
//! This module provides the per-index handle application code uses to run
//! queries built with [`QueryBuilder`] and to read or write single documents.
//!
//! # Query lifecycle
//!
//! Every query execution (`get`, `get_raw`, `count`, `first`) consumes the
//! builder's state: after the call the builder is back to its defaults
//! (offset 0, limit 50, no clauses). Use [`SearchIndexService::query`] to start
//! each query from a fresh builder.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::query::QueryBuilder;
use crate::response::{self, SearchEnvelope};

/// Query and document access for one named index.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use catalog_search_repository::{OpenSearchProvider, SearchIndexService};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Arc::new(OpenSearchProvider::new("http://localhost:9200", None).await?);
/// let service = SearchIndexService::new(provider, "autocomplete");
///
/// let mut query = service.query();
/// query.add_match("title", "cas").set_limit(10);
/// let documents = service.get(&mut query).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SearchIndexService {
    provider: Arc<dyn SearchIndexProvider>,
    index: String,
}

impl SearchIndexService {
    /// Create a new SearchIndexService bound to `index`.
    pub fn new(provider: Arc<dyn SearchIndexProvider>, index: impl Into<String>) -> Self {
        Self {
            provider,
            index: index.into(),
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    /// Start a new query with default state.
    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Run the query and return the matched source documents in relevance order.
    pub async fn get(&self, query: &mut QueryBuilder) -> Result<Vec<Value>, SearchIndexError> {
        let envelope = self.execute(query).await?;
        Ok(response::extract_documents(&envelope))
    }

    /// Run the query and return the raw engine response.
    pub async fn get_raw(&self, query: &mut QueryBuilder) -> Result<Value, SearchIndexError> {
        let request = query.take_request()?;
        self.provider.search(&self.index, &request).await
    }

    /// Run the query and return the parsed response envelope.
    pub async fn get_envelope(
        &self,
        query: &mut QueryBuilder,
    ) -> Result<SearchEnvelope, SearchIndexError> {
        self.execute(query).await
    }

    /// Run the query and return only the total hit count.
    pub async fn count(&self, query: &mut QueryBuilder) -> Result<u64, SearchIndexError> {
        let envelope = self.execute(query).await?;
        Ok(response::total_count(&envelope))
    }

    /// Run the query and return the best match, if any.
    pub async fn first(&self, query: &mut QueryBuilder) -> Result<Option<Value>, SearchIndexError> {
        Ok(self.get(query).await?.into_iter().next())
    }

    /// Fetch a document by id. A missing document is `Ok(None)`.
    pub async fn find(&self, id: &str) -> Result<Option<Value>, SearchIndexError> {
        self.provider.get_document(&self.index, id).await
    }

    /// Index a document, letting the engine assign an id when `id` is `None`.
    pub async fn create(&self, body: &Value, id: Option<&str>) -> Result<(), SearchIndexError> {
        self.provider.index_document(&self.index, id, body).await
    }

    /// Replace the document stored under `id`.
    pub async fn update(&self, body: &Value, id: &str) -> Result<(), SearchIndexError> {
        self.create(body, Some(id)).await
    }

    /// Delete the document stored under `id`. Returns `false` if it did not exist.
    pub async fn delete(&self, id: &str) -> Result<bool, SearchIndexError> {
        self.provider.delete_document(&self.index, id).await
    }

    #[instrument(skip(self, query), fields(index = %self.index))]
    async fn execute(&self, query: &mut QueryBuilder) -> Result<SearchEnvelope, SearchIndexError> {
        let request = query.take_request()?;
        let raw = self.provider.search(&self.index, &request).await?;
        let envelope = SearchEnvelope::from_value(raw)?;
        debug!(total = response::total_count(&envelope), "Search completed");
        Ok(envelope)
    }
}
