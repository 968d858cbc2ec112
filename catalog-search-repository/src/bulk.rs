//! Bulk payload construction.

use catalog_search_shared::Indexable;
use serde_json::{json, Value};

use crate::errors::SearchIndexError;

/// An ordered, flattened bulk operation list.
///
/// Index operations contribute two entries (operation descriptor, then the
/// document body); delete operations contribute only the descriptor. The order
/// in which operations are pushed is the order the engine applies them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkPayload {
    operations: Vec<Value>,
    records: usize,
}

impl BulkPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a payload with room for `records` index operations.
    pub fn with_capacity(records: usize) -> Self {
        Self {
            operations: Vec::with_capacity(records * 2),
            records: 0,
        }
    }

    /// Append an index (create-or-replace) operation.
    pub fn push_index(&mut self, index: &str, id: &str, body: Value) {
        self.operations
            .push(json!({ "index": { "_index": index, "_id": id } }));
        self.operations.push(body);
        self.records += 1;
    }

    /// Append a delete operation.
    pub fn push_delete(&mut self, index: &str, id: &str) {
        self.operations
            .push(json!({ "delete": { "_index": index, "_id": id } }));
        self.records += 1;
    }

    /// Append an index operation for an indexable record.
    pub fn push_record<T: Indexable>(
        &mut self,
        index: &str,
        record: &T,
    ) -> Result<(), SearchIndexError> {
        let body = record.to_document()?;
        self.push_index(index, &record.document_id(), body);
        Ok(())
    }

    /// Number of entries in the flattened list.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of operations (records) in the payload.
    pub fn record_count(&self) -> usize {
        self.records
    }

    pub fn operations(&self) -> &[Value] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<Value> {
        self.operations
    }
}
