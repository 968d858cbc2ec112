//! Index administration.
//!
//! Provisioning, dropping and bulk-loading named indices, plus single-document
//! writes for incremental updates outside a full reindex.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::bulk::BulkPayload;
use crate::config::{IndexAdminConfig, MAX_SETTLE_DELAY};
use crate::errors::SearchIndexError;
use crate::index_config::IndexDescriptor;
use crate::interfaces::SearchIndexProvider;
use crate::types::BulkSummary;

/// Administrative operations on named indices.
///
/// Create and delete are idempotent: creating an index that is already present
/// and deleting one that is already absent both succeed without touching the
/// engine state.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use catalog_search_repository::{IndexAdmin, IndexDescriptor, OpenSearchProvider};
/// use catalog_search_repository::index_config::EdgeNgramConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Arc::new(OpenSearchProvider::new("http://localhost:9200", None).await?);
/// let admin = IndexAdmin::new(provider);
///
/// let descriptor = IndexDescriptor::autocomplete("autocomplete", &EdgeNgramConfig::default())?;
/// admin.recreate(&descriptor).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct IndexAdmin {
    provider: Arc<dyn SearchIndexProvider>,
    config: IndexAdminConfig,
}

impl IndexAdmin {
    /// Create a new IndexAdmin with default configuration.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: IndexAdminConfig::default(),
        }
    }

    /// Create a new IndexAdmin with custom configuration.
    pub fn with_config(provider: Arc<dyn SearchIndexProvider>, config: IndexAdminConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &IndexAdminConfig {
        &self.config
    }

    /// Check whether the index exists.
    pub async fn exists(&self, index: &str) -> Result<bool, SearchIndexError> {
        Self::validate_index_name(index)?;
        self.provider.index_exists(index).await
    }

    /// Create the index unless it is already present.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the index was created
    /// * `Ok(false)` - If it already existed
    /// * `Err(SearchIndexError)` - If the check or the creation fails
    pub async fn create_if_missing(
        &self,
        descriptor: &IndexDescriptor,
    ) -> Result<bool, SearchIndexError> {
        if self.exists(&descriptor.name).await? {
            debug!(index = %descriptor.name, "Index already present");
            return Ok(false);
        }
        self.provider
            .create_index(&descriptor.name, &descriptor.body())
            .await?;
        Ok(true)
    }

    /// Delete the index if it exists.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the index was deleted
    /// * `Ok(false)` - If it did not exist
    /// * `Err(SearchIndexError)` - If the deletion fails
    pub async fn delete_if_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
        Self::validate_index_name(index)?;
        self.provider.delete_index(index).await
    }

    /// Drop and recreate the index with the descriptor's settings and mappings.
    ///
    /// Issues exactly one delete followed by exactly one create. Between the two
    /// the configured settle delay is awaited so the engine can finish removing
    /// the old index.
    #[instrument(skip(self, descriptor), fields(index = %descriptor.name))]
    pub async fn recreate(&self, descriptor: &IndexDescriptor) -> Result<(), SearchIndexError> {
        let deleted = self.delete_if_exists(&descriptor.name).await?;
        if deleted {
            self.settle().await;
        }
        self.create(descriptor).await?;

        info!(previously_present = deleted, "Index recreated");
        Ok(())
    }

    /// Create the index without checking for an existing one.
    pub async fn create(&self, descriptor: &IndexDescriptor) -> Result<(), SearchIndexError> {
        Self::validate_index_name(&descriptor.name)?;
        self.provider
            .create_index(&descriptor.name, &descriptor.body())
            .await
    }

    /// Wait out the configured settle delay after dropping an index.
    ///
    /// The delay is capped at [`MAX_SETTLE_DELAY`] however the config was built.
    pub async fn settle(&self) {
        let delay = self.config.settle_delay.min(MAX_SETTLE_DELAY);
        if !delay.is_zero() {
            debug!(
                settle_delay_ms = delay.as_millis() as u64,
                "Waiting for index removal to settle"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Submit a bulk payload and report the outcome of every item.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkSummary)` - Per-item results; item failures are listed, not raised
    /// * `Err(SearchIndexError::BatchSizeExceeded)` - If the payload exceeds `max_bulk_operations`
    /// * `Err(SearchIndexError)` - If the request as a whole fails
    #[instrument(skip(self, payload), fields(records = payload.record_count()))]
    pub async fn bulk_index(
        &self,
        index: &str,
        payload: BulkPayload,
    ) -> Result<BulkSummary, SearchIndexError> {
        Self::validate_index_name(index)?;
        if payload.is_empty() {
            return Ok(BulkSummary::empty());
        }
        if let Some(max) = self.config.max_bulk_operations {
            if payload.record_count() > max {
                return Err(SearchIndexError::batch_size_exceeded(
                    payload.record_count(),
                    max,
                ));
            }
        }

        let response = self.provider.bulk(index, payload.into_operations()).await?;
        let summary = BulkSummary::from_response(&response)?;

        if summary.has_failures() {
            warn!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                "Bulk request completed with some failures"
            );
        } else {
            debug!(count = summary.succeeded, "Bulk request fully applied");
        }
        Ok(summary)
    }

    /// Create or replace a single document.
    pub async fn upsert_document(
        &self,
        index: &str,
        id: &str,
        body: &Value,
    ) -> Result<(), SearchIndexError> {
        Self::validate_index_name(index)?;
        Self::validate_document_id(id)?;
        self.provider.index_document(index, Some(id), body).await
    }

    /// Delete a single document. A missing document is not an error.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the document was deleted
    /// * `Ok(false)` - If it did not exist
    pub async fn delete_document(&self, index: &str, id: &str) -> Result<bool, SearchIndexError> {
        Self::validate_index_name(index)?;
        Self::validate_document_id(id)?;
        self.provider.delete_document(index, id).await
    }

    fn validate_index_name(index: &str) -> Result<(), SearchIndexError> {
        if index.trim().is_empty() {
            return Err(SearchIndexError::validation("Index name is required"));
        }
        Ok(())
    }

    fn validate_document_id(id: &str) -> Result<(), SearchIndexError> {
        if id.trim().is_empty() {
            return Err(SearchIndexError::validation("Document id is required"));
        }
        Ok(())
    }
}
