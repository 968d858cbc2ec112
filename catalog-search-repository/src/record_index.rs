//! Record-level indexing for [`Indexable`] types.
//!
//! Binds a record type to an index name and exposes the operations an
//! application needs to keep the index in step with its system of record:
//! bulk update/delete of records, prefix search across the type's searchable
//! fields, pagination, resolving hits back to records, and flushing the whole
//! index.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use catalog_search_shared::{Indexable, Pagination};
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

use crate::admin::IndexAdmin;
use crate::bulk::BulkPayload;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::response::{self, SearchEnvelope};
use crate::types::BulkSummary;

/// Loads authoritative records from the system of record by document id.
///
/// Implementations may return records in any order and leave out ids that no
/// longer exist.
#[async_trait]
pub trait RecordLoader<T: Send>: Send + Sync {
    async fn load(&self, ids: &[String]) -> Result<Vec<T>, SearchIndexError>;
}

/// Index operations for records of type `T`.
///
/// Searches use a `multi_match` query of type `phrase_prefix` over
/// `T::searchable_fields()`; when the type declares no fields the engine
/// searches all of them.
pub struct RecordIndex<T> {
    provider: Arc<dyn SearchIndexProvider>,
    admin: IndexAdmin,
    index: String,
    _record: PhantomData<fn() -> T>,
}

impl<T: Indexable> RecordIndex<T> {
    pub fn new(provider: Arc<dyn SearchIndexProvider>, index: impl Into<String>) -> Self {
        Self {
            admin: IndexAdmin::new(provider.clone()),
            provider,
            index: index.into(),
            _record: PhantomData,
        }
    }

    /// Use a preconfigured admin (bulk limits, settle delay) for writes.
    pub fn with_admin(
        provider: Arc<dyn SearchIndexProvider>,
        admin: IndexAdmin,
        index: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            admin,
            index: index.into(),
            _record: PhantomData,
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    /// Index every record under its document id in a single bulk request.
    #[instrument(skip(self, records), fields(index = %self.index, count = records.len()))]
    pub async fn update(&self, records: &[T]) -> Result<BulkSummary, SearchIndexError> {
        let mut payload = BulkPayload::with_capacity(records.len());
        for record in records {
            payload.push_record(&self.index, record)?;
        }
        self.admin.bulk_index(&self.index, payload).await
    }

    /// Delete every record's document in a single bulk request.
    ///
    /// Records whose document is already absent count as successes.
    #[instrument(skip(self, records), fields(index = %self.index, count = records.len()))]
    pub async fn delete(&self, records: &[T]) -> Result<BulkSummary, SearchIndexError> {
        let mut payload = BulkPayload::new();
        for record in records {
            payload.push_delete(&self.index, &record.document_id());
        }
        self.admin.bulk_index(&self.index, payload).await
    }

    /// Prefix search with the engine's default page size.
    pub async fn search(&self, query: &str) -> Result<SearchEnvelope, SearchIndexError> {
        self.run(Self::search_body(query, None)).await
    }

    /// Prefix search returning `size` hits starting at `from`.
    pub async fn search_with(
        &self,
        query: &str,
        from: usize,
        size: usize,
    ) -> Result<SearchEnvelope, SearchIndexError> {
        self.run(Self::search_body(query, Some((from, size)))).await
    }

    /// Prefix search for one page of results; `per_page` sets the page size.
    pub async fn paginate(
        &self,
        query: &str,
        pagination: Pagination,
    ) -> Result<SearchEnvelope, SearchIndexError> {
        pagination.validate().map_err(SearchIndexError::validation)?;
        self.search_with(query, pagination.from(), pagination.size())
            .await
    }

    /// Identifiers of the hits, for re-fetching records from the system of record.
    pub fn map_ids(&self, envelope: &SearchEnvelope) -> Vec<String> {
        response::extract_identifiers(envelope)
    }

    /// Resolve the hits to records through `loader`, in hit order.
    ///
    /// Hits whose record the loader no longer has are skipped.
    pub async fn map(
        &self,
        envelope: &SearchEnvelope,
        loader: &dyn RecordLoader<T>,
    ) -> Result<Vec<T>, SearchIndexError>
    where
        T: Send,
    {
        let ids = self.map_ids(envelope);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_id: HashMap<String, T> = loader
            .load(&ids)
            .await?
            .into_iter()
            .map(|record| (record.document_id(), record))
            .collect();

        let records: Vec<T> = ids.iter().filter_map(|id| by_id.remove(id)).collect();
        if records.len() < ids.len() {
            debug!(
                index = %self.index,
                hits = ids.len(),
                resolved = records.len(),
                "Some hits no longer have a record"
            );
        }
        Ok(records)
    }

    pub fn total_count(&self, envelope: &SearchEnvelope) -> u64 {
        response::total_count(envelope)
    }

    /// Remove the whole index. Returns `false` if it did not exist.
    pub async fn flush(&self) -> Result<bool, SearchIndexError> {
        self.admin.delete_if_exists(&self.index).await
    }

    fn search_body(query: &str, window: Option<(usize, usize)>) -> Value {
        let mut multi_match = Map::new();
        multi_match.insert("query".to_string(), json!(query));
        multi_match.insert("type".to_string(), json!("phrase_prefix"));
        let fields = T::searchable_fields();
        if !fields.is_empty() {
            multi_match.insert("fields".to_string(), json!(fields));
        }

        let mut body = Map::new();
        body.insert(
            "query".to_string(),
            json!({ "multi_match": Value::Object(multi_match) }),
        );
        if let Some((from, size)) = window {
            body.insert("from".to_string(), json!(from));
            body.insert("size".to_string(), json!(size));
        }
        Value::Object(body)
    }

    async fn run(&self, body: Value) -> Result<SearchEnvelope, SearchIndexError> {
        let raw = self.provider.search(&self.index, &body).await?;
        let envelope = SearchEnvelope::from_value(raw)?;
        debug!(
            index = %self.index,
            total = response::total_count(&envelope),
            "Record search completed"
        );
        Ok(envelope)
    }
}
