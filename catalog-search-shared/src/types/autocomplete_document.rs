//! Autocomplete document types for the search index.
//!
//! This module defines the document structure fed into the autocomplete index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::indexable::Indexable;

/// Document representation for the autocomplete index.
///
/// The `title` field is the one analysed with the edge-n-gram analyzer and is
/// what autocomplete lookups return to callers.
///
/// # Fields
///
/// - `id`: Identifier of the record in the system of record
/// - `title`: Display title (primary search field)
/// - `description`: Optional description text
/// - `indexed_at`: Timestamp when the document was prepared for indexing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutoCompleteDocument {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "Utc::now")]
    pub indexed_at: DateTime<Utc>,
}

impl AutoCompleteDocument {
    /// Create a new document stamped with the current time.
    ///
    /// # Example
    ///
    /// ```
    /// use catalog_search_shared::AutoCompleteDocument;
    ///
    /// let doc = AutoCompleteDocument::new("42", "Casablanca", None);
    /// assert_eq!(doc.title, "Casablanca");
    /// ```
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description,
            indexed_at: Utc::now(),
        }
    }
}

impl Indexable for AutoCompleteDocument {
    fn document_id(&self) -> String {
        self.id.clone()
    }

    fn to_document(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["title", "description"]
    }
}
