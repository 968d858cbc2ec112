//! Response formatting.
//!
//! Reshapes a search response envelope into hit counts, source documents,
//! identifiers, or scored documents.

use catalog_search_shared::ScoredDocument;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::SearchIndexError;

/// The parts of a search response the adapter reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchEnvelope {
    #[serde(default)]
    pub hits: HitsEnvelope,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// Total hit count: `{ "value": n, "relation": ... }`, or a bare number on older engines.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Object { value: u64 },
    Count(u64),
}

/// One matched document.
#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Value,
}

impl SearchEnvelope {
    /// Parse a raw engine response.
    pub fn from_value(value: Value) -> Result<Self, SearchIndexError> {
        serde_json::from_value(value)
            .map_err(|e| SearchIndexError::parse(format!("Invalid search response: {}", e)))
    }
}

/// Total number of matching documents, 0 when the envelope carries no total.
pub fn total_count(envelope: &SearchEnvelope) -> u64 {
    match envelope.hits.total {
        Some(TotalHits::Object { value }) | Some(TotalHits::Count(value)) => value,
        None => 0,
    }
}

/// Source documents in engine order (relevance order), empty when nothing matched.
pub fn extract_documents(envelope: &SearchEnvelope) -> Vec<Value> {
    if total_count(envelope) == 0 {
        return Vec::new();
    }
    envelope.hits.hits.iter().map(|hit| hit.source.clone()).collect()
}

/// Hit identifiers in engine order.
///
/// Used to re-fetch authoritative records from the system of record instead of
/// trusting the indexed copy.
pub fn extract_identifiers(envelope: &SearchEnvelope) -> Vec<String> {
    if total_count(envelope) == 0 {
        return Vec::new();
    }
    envelope.hits.hits.iter().map(|hit| hit.id.clone()).collect()
}

/// Source documents annotated with their identifier and relevance score.
pub fn extract_scored(envelope: &SearchEnvelope) -> Vec<ScoredDocument> {
    if total_count(envelope) == 0 {
        return Vec::new();
    }
    envelope
        .hits
        .hits
        .iter()
        .map(|hit| ScoredDocument {
            id: hit.id.clone(),
            score: hit.score,
            source: hit.source.clone(),
        })
        .collect()
}
