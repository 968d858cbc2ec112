//! Integration tests for feeding and querying the autocomplete index.
//!
//! These tests run the real Feeder and SearchFacade against an in-memory
//! engine that stores bulk-loaded documents and answers title prefix queries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use catalog_search::{
    Dependencies, FeedError, FeederState, JsonLinesSource, Settings, VecSource,
};
use catalog_search_repository::{SearchIndexError, SearchIndexProvider};
use catalog_search_shared::AutoCompleteDocument;
use serde_json::{json, Value};
use uuid::Uuid;

/// In-memory engine keeping documents per index in insertion order.
#[derive(Default)]
struct InMemoryEngine {
    indices: Mutex<HashMap<String, Vec<(String, Value)>>>,
    calls: Mutex<Vec<String>>,
    bulk_sizes: Mutex<Vec<usize>>,
}

impl InMemoryEngine {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
        self.bulk_sizes.lock().unwrap().clear();
    }

    fn document_count(&self, index: &str) -> usize {
        self.indices
            .lock()
            .unwrap()
            .get(index)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Title query text from a bool query's first match clause.
    fn title_prefix(body: &Value) -> Option<String> {
        let clause = body["query"]["bool"]["should"]
            .get(0)
            .or_else(|| body["query"]["bool"]["must"].get(0))?;
        clause["match"]["title"]["query"]
            .as_str()
            .map(|q| q.to_lowercase())
    }
}

#[async_trait]
impl SearchIndexProvider for InMemoryEngine {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
        Ok(self.indices.lock().unwrap().contains_key(index))
    }

    async fn create_index(&self, index: &str, _body: &Value) -> Result<(), SearchIndexError> {
        self.calls.lock().unwrap().push(format!("create:{}", index));
        let mut indices = self.indices.lock().unwrap();
        if indices.contains_key(index) {
            return Err(SearchIndexError::index_creation("resource_already_exists_exception"));
        }
        indices.insert(index.to_string(), Vec::new());
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<bool, SearchIndexError> {
        self.calls.lock().unwrap().push(format!("delete:{}", index));
        Ok(self.indices.lock().unwrap().remove(index).is_some())
    }

    async fn search(&self, index: &str, body: &Value) -> Result<Value, SearchIndexError> {
        let indices = self.indices.lock().unwrap();
        let documents = indices
            .get(index)
            .ok_or_else(|| SearchIndexError::search("index_not_found_exception"))?;

        let prefix = Self::title_prefix(body);
        let size = body["size"].as_u64().unwrap_or(10) as usize;
        let matched: Vec<&(String, Value)> = documents
            .iter()
            .filter(|(_, doc)| match &prefix {
                None => true,
                Some(prefix) => doc["title"]
                    .as_str()
                    .map(|title| {
                        title
                            .to_lowercase()
                            .split_whitespace()
                            .any(|word| word.starts_with(prefix.as_str()))
                    })
                    .unwrap_or(false),
            })
            .collect();

        let hits: Vec<Value> = matched
            .iter()
            .take(size)
            .map(|(id, doc)| json!({ "_id": id, "_score": 1.0, "_source": doc }))
            .collect();
        Ok(json!({ "hits": { "total": { "value": matched.len() }, "hits": hits } }))
    }

    async fn get_document(&self, index: &str, id: &str) -> Result<Option<Value>, SearchIndexError> {
        Ok(self.indices.lock().unwrap().get(index).and_then(|docs| {
            docs.iter()
                .find(|(doc_id, _)| doc_id == id)
                .map(|(_, doc)| doc.clone())
        }))
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
        Ok(false)
    }

    async fn bulk(&self, index: &str, operations: Vec<Value>) -> Result<Value, SearchIndexError> {
        self.calls.lock().unwrap().push(format!("bulk:{}", index));
        self.bulk_sizes.lock().unwrap().push(operations.len());

        let mut indices = self.indices.lock().unwrap();
        let documents = indices
            .get_mut(index)
            .ok_or_else(|| SearchIndexError::bulk_index("index_not_found_exception"))?;

        let mut items = Vec::new();
        for pair in operations.chunks(2) {
            let id = pair[0]["index"]["_id"].as_str().unwrap_or_default().to_string();
            documents.push((id.clone(), pair[1].clone()));
            items.push(json!({ "index": { "_id": id, "status": 201 } }));
        }
        Ok(json!({ "errors": false, "items": items }))
    }
}

fn deps(engine: Arc<InMemoryEngine>, vars: &[(&str, &str)]) -> Dependencies {
    let settings = Settings::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    });
    Dependencies::with_provider(settings, engine).unwrap()
}

fn catalog() -> Vec<AutoCompleteDocument> {
    vec![
        AutoCompleteDocument::new("1", "Casablanca", None),
        AutoCompleteDocument::new("2", "Case Study", Some("Teaching material".to_string())),
        AutoCompleteDocument::new("3", "Dune", None),
    ]
}

#[tokio::test]
async fn test_feed_then_auto_complete() {
    let engine = Arc::new(InMemoryEngine::default());
    let mut deps = deps(engine.clone(), &[]);

    let report = deps.feeder.sync(&mut VecSource::new(catalog())).await.unwrap();
    assert_eq!(report.indexed, 3);
    assert_eq!(deps.feeder.state(), FeederState::Idle);

    let titles = deps.facade.auto_complete("cas").await.unwrap();
    assert_eq!(titles, vec!["Casablanca", "Case Study"]);

    let documents = deps.facade.look_for("dune", 5).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["title"], "Dune");

    assert!(deps.facade.auto_complete("zzz").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reindex_replaces_previous_contents() {
    let engine = Arc::new(InMemoryEngine::default());
    let mut deps = deps(engine.clone(), &[]);

    deps.feeder.sync(&mut VecSource::new(catalog())).await.unwrap();
    engine.clear_calls();

    let report = deps
        .feeder
        .sync(&mut VecSource::new(vec![AutoCompleteDocument::new("9", "Castle", None)]))
        .await
        .unwrap();

    assert_eq!(report.records, 1);
    assert_eq!(
        engine.calls(),
        vec!["delete:autocomplete", "create:autocomplete", "bulk:autocomplete"]
    );
    assert_eq!(engine.document_count("autocomplete"), 1);
    assert_eq!(deps.facade.auto_complete("cas").await.unwrap(), vec!["Castle"]);
}

#[tokio::test]
async fn test_large_feed_is_chunked() {
    let engine = Arc::new(InMemoryEngine::default());
    let mut deps = deps(engine.clone(), &[("SEARCH_INDEX_NAME", "titles")]);

    let records: Vec<AutoCompleteDocument> = (0..250)
        .map(|i| AutoCompleteDocument::new(i.to_string(), format!("Title {}", i), None))
        .collect();
    let report = deps.feeder.sync(&mut VecSource::new(records)).await.unwrap();

    assert_eq!(report.chunks, 3);
    assert_eq!(*engine.bulk_sizes.lock().unwrap(), vec![200, 200, 100]);
    assert_eq!(engine.document_count("titles"), 250);
}

#[tokio::test]
async fn test_feed_from_json_lines_file() {
    let path = std::env::temp_dir().join(format!("catalog-{}.jsonl", Uuid::new_v4()));
    let lines: String = catalog()
        .iter()
        .map(|doc| format!("{}\n", serde_json::to_string(doc).unwrap()))
        .collect();
    tokio::fs::write(&path, lines).await.unwrap();

    let engine = Arc::new(InMemoryEngine::default());
    let mut deps = deps(engine.clone(), &[("FEEDER_CHUNK_SIZE", "2")]);

    let mut source = JsonLinesSource::<AutoCompleteDocument>::open(&path).await.unwrap();
    let report = deps.feeder.sync(&mut source).await.unwrap();
    tokio::fs::remove_file(&path).await.unwrap();

    assert_eq!(report.chunks, 2);
    assert_eq!(*engine.bulk_sizes.lock().unwrap(), vec![4, 2]);
    assert_eq!(deps.facade.auto_complete("du").await.unwrap(), vec!["Dune"]);
}

#[tokio::test]
async fn test_malformed_source_aborts_after_indexed_chunks() {
    let path = std::env::temp_dir().join(format!("catalog-{}.jsonl", Uuid::new_v4()));
    tokio::fs::write(
        &path,
        "{\"id\":\"1\",\"title\":\"Casablanca\"}\n{\"id\":\"2\",\"title\":\"Dune\"}\n{broken\n",
    )
    .await
    .unwrap();

    let engine = Arc::new(InMemoryEngine::default());
    let mut deps = deps(engine.clone(), &[("FEEDER_CHUNK_SIZE", "2")]);

    let mut source = JsonLinesSource::<AutoCompleteDocument>::open(&path).await.unwrap();
    let err = deps.feeder.sync(&mut source).await.unwrap_err();
    tokio::fs::remove_file(&path).await.unwrap();

    assert!(matches!(err, FeedError::SourceError { chunks_read: 1, .. }));
    assert_eq!(engine.document_count("autocomplete"), 2);
    assert_eq!(deps.feeder.state(), FeederState::Idle);
}
