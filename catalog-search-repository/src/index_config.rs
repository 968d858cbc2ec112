//! Index descriptors: settings and mappings used to provision an index.
//!
//! An index's analysis settings and mappings are fixed once it exists in the
//! engine, so changing them means deleting and recreating the index.

use serde_json::{json, Value};

use crate::errors::SearchIndexError;

/// The default name of the autocomplete index.
pub const AUTOCOMPLETE_INDEX_NAME: &str = "autocomplete";

/// Name of the custom analyzer registered by [`IndexDescriptor::autocomplete`].
pub const AUTOCOMPLETE_ANALYZER: &str = "autocomplete";

/// Everything needed to provision an index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDescriptor {
    /// The index name.
    pub name: String,
    /// Shard/replica counts and the analysis chain.
    pub settings: Value,
    /// Per-field types and analyzers.
    pub mappings: Value,
}

impl IndexDescriptor {
    /// Create a descriptor from raw settings and mappings.
    pub fn new(name: impl Into<String>, settings: Value, mappings: Value) -> Self {
        Self {
            name: name.into(),
            settings,
            mappings,
        }
    }

    /// Descriptor for a prefix-autocomplete index over a `title` field.
    ///
    /// # Arguments
    ///
    /// * `name` - The index name
    /// * `ngram` - Edge-n-gram bounds for the analyzer
    pub fn autocomplete(
        name: impl Into<String>,
        ngram: &EdgeNgramConfig,
    ) -> Result<Self, SearchIndexError> {
        ngram.validate()?;
        Ok(Self::new(
            name,
            get_autocomplete_settings(ngram),
            get_autocomplete_mappings(),
        ))
    }

    /// The `{ settings, mappings }` body sent with the create-index request.
    pub fn body(&self) -> Value {
        json!({
            "settings": self.settings,
            "mappings": self.mappings,
        })
    }
}

/// Bounds of the edge-n-gram token filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeNgramConfig {
    pub min_gram: u32,
    pub max_gram: u32,
}

impl Default for EdgeNgramConfig {
    fn default() -> Self {
        Self {
            min_gram: 1,
            max_gram: 20,
        }
    }
}

impl EdgeNgramConfig {
    pub fn new(min_gram: u32, max_gram: u32) -> Self {
        Self { min_gram, max_gram }
    }

    /// Check that `1 <= min_gram <= max_gram`.
    pub fn validate(&self) -> Result<(), SearchIndexError> {
        if self.min_gram == 0 {
            return Err(SearchIndexError::validation(
                "min_gram must be at least 1".to_string(),
            ));
        }
        if self.min_gram > self.max_gram {
            return Err(SearchIndexError::validation(format!(
                "min_gram ({}) must not exceed max_gram ({})",
                self.min_gram, self.max_gram
            )));
        }
        Ok(())
    }
}

/// Get the index settings for the autocomplete index.
///
/// The configuration includes:
/// - **autocomplete_filter**: Edge-n-gram token filter with the configured bounds
/// - **autocomplete analyzer**: Standard tokenizer, lowercase, then the edge-n-gram filter
///
/// # Sharding Configuration
///
/// - 1 primary shard
/// - 0 replicas (the index is rebuilt from the system of record on demand)
pub fn get_autocomplete_settings(ngram: &EdgeNgramConfig) -> Value {
    json!({
        "number_of_shards": 1,
        "number_of_replicas": 0,
        "analysis": {
            "filter": {
                "autocomplete_filter": {
                    "type": "edge_ngram",
                    "min_gram": ngram.min_gram,
                    "max_gram": ngram.max_gram
                }
            },
            "analyzer": {
                AUTOCOMPLETE_ANALYZER: {
                    "type": "custom",
                    "tokenizer": "standard",
                    "filter": ["lowercase", "autocomplete_filter"]
                }
            }
        }
    })
}

/// Get the mappings for the autocomplete index.
///
/// `title` is indexed with the n-gram analyzer but searched with the standard
/// analyzer, so a query's own prefixes are not expanded into grams.
pub fn get_autocomplete_mappings() -> Value {
    json!({
        "properties": {
            "title": {
                "type": "text",
                "analyzer": AUTOCOMPLETE_ANALYZER,
                "search_analyzer": "standard"
            },
            "description": {
                "type": "text"
            },
            "indexed_at": {
                "type": "date"
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autocomplete_descriptor_structure() {
        let descriptor =
            IndexDescriptor::autocomplete(AUTOCOMPLETE_INDEX_NAME, &EdgeNgramConfig::default())
                .unwrap();
        let body = descriptor.body();

        assert_eq!(descriptor.name, "autocomplete");
        assert_eq!(body["settings"]["number_of_shards"], 1);
        assert_eq!(body["settings"]["number_of_replicas"], 0);

        let filter = &body["settings"]["analysis"]["filter"]["autocomplete_filter"];
        assert_eq!(filter["type"], "edge_ngram");
        assert_eq!(filter["min_gram"], 1);
        assert_eq!(filter["max_gram"], 20);

        let analyzer = &body["settings"]["analysis"]["analyzer"]["autocomplete"];
        assert_eq!(analyzer["tokenizer"], "standard");
        assert_eq!(analyzer["filter"][0], "lowercase");
        assert_eq!(analyzer["filter"][1], "autocomplete_filter");

        assert_eq!(body["mappings"]["properties"]["title"]["type"], "text");
        assert_eq!(
            body["mappings"]["properties"]["title"]["analyzer"],
            "autocomplete"
        );
    }

    #[test]
    fn test_custom_gram_bounds() {
        let descriptor =
            IndexDescriptor::autocomplete("titles", &EdgeNgramConfig::new(2, 10)).unwrap();
        let filter = &descriptor.settings["analysis"]["filter"]["autocomplete_filter"];
        assert_eq!(filter["min_gram"], 2);
        assert_eq!(filter["max_gram"], 10);
    }

    #[test]
    fn test_invalid_gram_bounds() {
        assert!(matches!(
            IndexDescriptor::autocomplete("titles", &EdgeNgramConfig::new(0, 10)),
            Err(SearchIndexError::ValidationError(_))
        ));
        assert!(matches!(
            IndexDescriptor::autocomplete("titles", &EdgeNgramConfig::new(5, 3)),
            Err(SearchIndexError::ValidationError(_))
        ));
    }
}
