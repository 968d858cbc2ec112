//! Feeder module: full reindex of a search index from a data source.
//!
//! A run drops the index, recreates it from its descriptor, then streams the
//! source in fixed-size chunks, submitting each chunk as one bulk request.

use std::fmt;
use std::time::{Duration, Instant};

use catalog_search_repository::{BulkPayload, IndexAdmin, IndexDescriptor, SearchIndexError};
use catalog_search_shared::Indexable;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::errors::FeedError;
use crate::source::DataSource;

/// Default number of records per bulk request.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Configuration for the feeder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeederConfig {
    /// Number of records read from the source and submitted per bulk request.
    pub chunk_size: usize,
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl FeederConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn validate(&self) -> Result<(), FeedError> {
        if self.chunk_size == 0 {
            return Err(FeedError::config("chunk_size must be greater than 0"));
        }
        Ok(())
    }
}

/// Where a feeder run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeederState {
    #[default]
    Idle,
    IndexDropped,
    IndexCreated,
    Streaming,
}

impl fmt::Display for FeederState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::IndexDropped => "index_dropped",
            Self::IndexCreated => "index_created",
            Self::Streaming => "streaming",
        };
        f.write_str(name)
    }
}

/// A document the engine rejected during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedItem {
    /// 1-based number of the chunk the document was sent in.
    pub chunk: usize,
    pub id: String,
    pub reason: String,
}

/// Outcome of a completed reindex.
#[derive(Debug, Clone)]
pub struct ReindexReport {
    pub run_id: Uuid,
    pub index: String,
    pub started_at: DateTime<Utc>,
    /// Number of chunks submitted.
    pub chunks: usize,
    /// Number of records read from the source.
    pub records: usize,
    /// Number of documents the engine accepted.
    pub indexed: usize,
    pub failed_items: Vec<FailedItem>,
    pub elapsed: Duration,
}

impl ReindexReport {
    pub fn is_complete(&self) -> bool {
        self.failed_items.is_empty()
    }
}

/// Feeder that rebuilds one index from a data source.
pub struct Feeder {
    admin: IndexAdmin,
    descriptor: IndexDescriptor,
    config: FeederConfig,
    state: FeederState,
}

impl Feeder {
    /// Create a new feeder with default configuration.
    pub fn new(admin: IndexAdmin, descriptor: IndexDescriptor) -> Self {
        Self::with_config(admin, descriptor, FeederConfig::default())
    }

    /// Create a new feeder with custom configuration.
    pub fn with_config(
        admin: IndexAdmin,
        descriptor: IndexDescriptor,
        config: FeederConfig,
    ) -> Self {
        Self {
            admin,
            descriptor,
            config,
            state: FeederState::Idle,
        }
    }

    pub fn state(&self) -> FeederState {
        self.state
    }

    pub fn config(&self) -> &FeederConfig {
        &self.config
    }

    pub fn index_name(&self) -> &str {
        &self.descriptor.name
    }

    /// Build the bulk payload for one chunk: an index descriptor followed by
    /// the document body for every record, in record order.
    pub fn format<T: Indexable>(&self, records: &[T]) -> Result<BulkPayload, SearchIndexError> {
        let mut payload = BulkPayload::with_capacity(records.len());
        for record in records {
            payload.push_record(&self.descriptor.name, record)?;
        }
        Ok(payload)
    }

    /// Drop and recreate the index, then stream every record from `source`.
    ///
    /// The feeder is back in [`FeederState::Idle`] when this returns, whether
    /// the run succeeded or not.
    ///
    /// # Returns
    ///
    /// * `Ok(ReindexReport)` - All chunks were submitted; rejected documents are listed
    /// * `Err(FeedError::IndexSetup)` - The index could not be dropped or created
    /// * `Err(FeedError::ChunkFailed)` - A chunk failed; earlier chunks stay indexed
    /// * `Err(FeedError::SourceError)` - The source could not produce the next chunk
    #[instrument(skip(self, source), fields(index = %self.descriptor.name))]
    pub async fn sync<S: DataSource>(
        &mut self,
        source: &mut S,
    ) -> Result<ReindexReport, FeedError> {
        self.config.validate()?;
        if let Some(max) = self.admin.config().max_bulk_operations {
            if self.config.chunk_size > max {
                return Err(FeedError::config(format!(
                    "chunk_size {} exceeds the bulk limit of {}",
                    self.config.chunk_size, max
                )));
            }
        }

        let result = self.run(source).await;
        self.state = FeederState::Idle;

        if let Err(e) = &result {
            error!(error = %e, "Reindex failed");
        }
        result
    }

    async fn run<S: DataSource>(&mut self, source: &mut S) -> Result<ReindexReport, FeedError> {
        let started = Instant::now();
        let mut report = ReindexReport {
            run_id: Uuid::new_v4(),
            index: self.descriptor.name.clone(),
            started_at: Utc::now(),
            chunks: 0,
            records: 0,
            indexed: 0,
            failed_items: Vec::new(),
            elapsed: Duration::ZERO,
        };

        info!(
            run_id = %report.run_id,
            chunk_size = self.config.chunk_size,
            "Starting reindex"
        );

        let deleted = self
            .admin
            .delete_if_exists(&self.descriptor.name)
            .await
            .map_err(FeedError::IndexSetup)?;
        self.transition(FeederState::IndexDropped);

        if deleted {
            self.admin.settle().await;
        }
        self.admin
            .create(&self.descriptor)
            .await
            .map_err(FeedError::IndexSetup)?;
        self.transition(FeederState::IndexCreated);

        self.transition(FeederState::Streaming);
        loop {
            let records = source
                .next_chunk(self.config.chunk_size)
                .await
                .map_err(|e| FeedError::source_failed(report.chunks, e.to_string()))?;
            if records.is_empty() {
                break;
            }

            let chunk = report.chunks + 1;
            let count = records.len();
            let payload = self
                .format(&records)
                .map_err(|e| FeedError::chunk_failed(chunk, count, e))?;
            let summary = self
                .admin
                .bulk_index(&self.descriptor.name, payload)
                .await
                .map_err(|e| FeedError::chunk_failed(chunk, count, e))?;

            if summary.has_failures() {
                warn!(
                    chunk,
                    failed = summary.failed,
                    "Chunk indexed with rejected documents"
                );
            }
            report.failed_items.extend(summary.failures().map(|item| FailedItem {
                chunk,
                id: item.id.clone(),
                reason: item
                    .error
                    .clone()
                    .unwrap_or_else(|| format!("status {}", item.status)),
            }));
            report.chunks = chunk;
            report.records += count;
            report.indexed += summary.succeeded;

            debug!(chunk, records = count, indexed = summary.succeeded, "Chunk submitted");
        }

        report.elapsed = started.elapsed();
        info!(
            run_id = %report.run_id,
            chunks = report.chunks,
            records = report.records,
            indexed = report.indexed,
            failed = report.failed_items.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Reindex completed"
        );
        Ok(report)
    }

    fn transition(&mut self, next: FeederState) {
        debug!(from = %self.state, to = %next, "Feeder state change");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::VecSource;
    use async_trait::async_trait;
    use catalog_search_repository::index_config::EdgeNgramConfig;
    use catalog_search_repository::{IndexAdminConfig, SearchIndexProvider};
    use catalog_search_shared::AutoCompleteDocument;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Mock engine recording calls; optionally fails a given bulk request or
    /// rejects documents by id.
    struct MockProvider {
        calls: Mutex<Vec<String>>,
        bulks: Mutex<Vec<Vec<Value>>>,
        bulk_count: AtomicUsize,
        fail_bulk_number: Option<usize>,
        reject_id: Option<String>,
        fail_create: bool,
        present: bool,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                bulks: Mutex::new(Vec::new()),
                bulk_count: AtomicUsize::new(0),
                fail_bulk_number: None,
                reject_id: None,
                fail_create: false,
                present: true,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn bulk_sizes(&self) -> Vec<usize> {
            self.bulks.lock().unwrap().iter().map(Vec::len).collect()
        }
    }

    #[async_trait]
    impl SearchIndexProvider for MockProvider {
        async fn index_exists(&self, _index: &str) -> Result<bool, SearchIndexError> {
            Ok(self.present)
        }

        async fn create_index(&self, index: &str, body: &Value) -> Result<(), SearchIndexError> {
            self.calls.lock().unwrap().push(format!("create:{}", index));
            if self.fail_create {
                return Err(SearchIndexError::index_creation("cluster read-only"));
            }
            assert!(body["settings"]["analysis"].is_object());
            Ok(())
        }

        async fn delete_index(&self, index: &str) -> Result<bool, SearchIndexError> {
            self.calls.lock().unwrap().push(format!("delete:{}", index));
            Ok(self.present)
        }

        async fn search(&self, _index: &str, _body: &Value) -> Result<Value, SearchIndexError> {
            Ok(json!({ "hits": { "total": { "value": 0 }, "hits": [] } }))
        }

        async fn get_document(
            &self,
            _index: &str,
            _id: &str,
        ) -> Result<Option<Value>, SearchIndexError> {
            Ok(None)
        }

        async fn index_document(
            &self,
            _index: &str,
            _id: Option<&str>,
            _body: &Value,
        ) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn delete_document(&self, _index: &str, _id: &str) -> Result<bool, SearchIndexError> {
            Ok(true)
        }

        async fn bulk(
            &self,
            index: &str,
            operations: Vec<Value>,
        ) -> Result<Value, SearchIndexError> {
            let number = self.bulk_count.fetch_add(1, Ordering::SeqCst) + 1;
            self.calls.lock().unwrap().push(format!("bulk:{}", index));
            if self.fail_bulk_number == Some(number) {
                return Err(SearchIndexError::connection("connection reset"));
            }

            let items: Vec<Value> = operations
                .iter()
                .filter_map(|op| op.get("index"))
                .map(|meta| {
                    if self.reject_id.as_deref() == meta["_id"].as_str() {
                        json!({ "index": {
                            "_id": meta["_id"],
                            "status": 400,
                            "error": { "type": "mapper_parsing_exception", "reason": "bad title" }
                        }})
                    } else {
                        json!({ "index": { "_id": meta["_id"], "status": 201 } })
                    }
                })
                .collect();
            self.bulks.lock().unwrap().push(operations);
            Ok(json!({ "errors": self.reject_id.is_some(), "items": items }))
        }
    }

    fn records(count: usize) -> Vec<AutoCompleteDocument> {
        (0..count)
            .map(|i| AutoCompleteDocument::new(i.to_string(), format!("Title {}", i), None))
            .collect()
    }

    fn feeder(provider: Arc<MockProvider>) -> Feeder {
        let descriptor =
            IndexDescriptor::autocomplete("autocomplete", &EdgeNgramConfig::default()).unwrap();
        Feeder::new(IndexAdmin::new(provider), descriptor)
    }

    #[test]
    fn test_format_alternates_descriptor_and_body() {
        let feeder = feeder(Arc::new(MockProvider::new()));
        let payload = feeder
            .format(&[
                AutoCompleteDocument::new("1", "Casablanca", None),
                AutoCompleteDocument::new("2", "Dune", None),
            ])
            .unwrap();

        assert_eq!(payload.len(), 4);
        let operations = payload.operations();
        assert_eq!(
            operations[0],
            json!({ "index": { "_index": "autocomplete", "_id": "1" } })
        );
        assert_eq!(operations[1]["title"], "Casablanca");
        assert_eq!(operations[2]["index"]["_id"], "2");
        assert_eq!(operations[3]["title"], "Dune");
    }

    #[tokio::test]
    async fn test_sync_chunks_records() {
        let provider = Arc::new(MockProvider::new());
        let mut feeder = feeder(provider.clone());
        let mut source = VecSource::new(records(250));

        let report = feeder.sync(&mut source).await.unwrap();

        assert_eq!(provider.bulk_sizes(), vec![200, 200, 100]);
        assert_eq!(report.chunks, 3);
        assert_eq!(report.records, 250);
        assert_eq!(report.indexed, 250);
        assert!(report.is_complete());
        assert_eq!(feeder.state(), FeederState::Idle);
    }

    #[tokio::test]
    async fn test_sync_drops_once_and_creates_once_before_streaming() {
        let provider = Arc::new(MockProvider::new());
        let mut feeder = feeder(provider.clone());

        feeder.sync(&mut VecSource::new(records(10))).await.unwrap();

        assert_eq!(
            provider.calls(),
            vec!["delete:autocomplete", "create:autocomplete", "bulk:autocomplete"]
        );
    }

    #[tokio::test]
    async fn test_sync_empty_source_still_recreates_index() {
        let provider = Arc::new(MockProvider {
            present: false,
            ..MockProvider::new()
        });
        let mut feeder = feeder(provider.clone());

        let report = feeder
            .sync(&mut VecSource::<AutoCompleteDocument>::new(Vec::new()))
            .await
            .unwrap();

        assert_eq!(report.chunks, 0);
        assert_eq!(provider.calls(), vec!["delete:autocomplete", "create:autocomplete"]);
    }

    #[tokio::test]
    async fn test_chunk_failure_aborts_with_context() {
        let provider = Arc::new(MockProvider {
            fail_bulk_number: Some(2),
            ..MockProvider::new()
        });
        let mut feeder = feeder(provider.clone());

        let err = feeder
            .sync(&mut VecSource::new(records(250)))
            .await
            .unwrap_err();

        match err {
            FeedError::ChunkFailed {
                chunk,
                records,
                source,
            } => {
                assert_eq!(chunk, 2);
                assert_eq!(records, 100);
                assert!(source.is_transport());
            }
            other => panic!("expected chunk failure, got {}", other),
        }
        // The first chunk stays indexed and the third is never sent.
        assert_eq!(provider.bulk_sizes(), vec![200]);
        assert_eq!(feeder.state(), FeederState::Idle);
    }

    #[tokio::test]
    async fn test_rejected_documents_are_reported() {
        let provider = Arc::new(MockProvider {
            reject_id: Some("3".to_string()),
            ..MockProvider::new()
        });
        let mut feeder = feeder(provider);

        let report = feeder.sync(&mut VecSource::new(records(5))).await.unwrap();

        assert_eq!(report.indexed, 4);
        assert_eq!(
            report.failed_items,
            vec![FailedItem {
                chunk: 1,
                id: "3".to_string(),
                reason: "mapper_parsing_exception: bad title".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_index_setup_failure_streams_nothing() {
        let provider = Arc::new(MockProvider {
            fail_create: true,
            ..MockProvider::new()
        });
        let mut feeder = feeder(provider.clone());

        let err = feeder
            .sync(&mut VecSource::new(records(5)))
            .await
            .unwrap_err();

        assert!(matches!(err, FeedError::IndexSetup(_)));
        assert!(provider.bulk_sizes().is_empty());
        assert_eq!(feeder.state(), FeederState::Idle);
    }

    #[tokio::test]
    async fn test_invalid_chunk_size() {
        let provider = Arc::new(MockProvider::new());
        let descriptor =
            IndexDescriptor::autocomplete("autocomplete", &EdgeNgramConfig::default()).unwrap();

        let mut zero = Feeder::with_config(
            IndexAdmin::new(provider.clone()),
            descriptor.clone(),
            FeederConfig::default().with_chunk_size(0),
        );
        assert!(matches!(
            zero.sync(&mut VecSource::new(records(1))).await,
            Err(FeedError::ConfigError(_))
        ));

        let admin = IndexAdmin::with_config(
            provider.clone(),
            IndexAdminConfig::default().with_max_bulk_operations(50),
        );
        let mut oversized = Feeder::new(admin, descriptor);
        assert!(matches!(
            oversized.sync(&mut VecSource::new(records(1))).await,
            Err(FeedError::ConfigError(_))
        ));

        assert!(provider.calls().is_empty());
    }
}
