//! Bulk operation result types.

use serde_json::Value;

use crate::errors::SearchIndexError;

/// Result of a bulk operation for a single item.
///
/// This struct represents the outcome of a single operation within a bulk
/// request (indexing or deleting one document). It indicates whether the
/// operation succeeded and carries the engine's reason if it failed.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemResult {
    /// The document identifier.
    pub id: String,
    /// HTTP status the engine reported for this item.
    pub status: u16,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error reason if the operation failed.
    pub error: Option<String>,
}

/// Summary of a bulk operation containing aggregate statistics and individual results.
///
/// Bulk requests can partially fail; this summary lists every item so that
/// callers can handle failures item by item instead of all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkSummary {
    /// Total number of items in the bulk response.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item, in request order.
    pub items: Vec<BulkItemResult>,
}

impl BulkSummary {
    /// Summary of a bulk request that sent nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether any item failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// The failed items.
    pub fn failures(&self) -> impl Iterator<Item = &BulkItemResult> {
        self.items.iter().filter(|item| !item.success)
    }

    /// Parse an engine bulk response.
    ///
    /// Each entry of `items` is an object keyed by the action (`index`,
    /// `delete`, ...) whose value carries `_id`, `status` and an optional
    /// `error`. Deleting an absent document (`404` without an error object)
    /// counts as a success.
    pub fn from_response(response: &Value) -> Result<Self, SearchIndexError> {
        let items = response["items"].as_array().ok_or_else(|| {
            SearchIndexError::parse("Bulk response does not contain an items array")
        })?;

        let mut summary = BulkSummary::empty();
        for item in items {
            let (action, result) = item
                .as_object()
                .and_then(|entry| entry.iter().next())
                .ok_or_else(|| SearchIndexError::parse("Bulk response item has no action"))?;

            let id = match &result["_id"] {
                Value::String(id) => id.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            let status = result["status"].as_u64().unwrap_or(0) as u16;
            let error = match &result["error"] {
                Value::Null => None,
                error => Some(Self::error_reason(error)),
            };
            let already_absent = action == "delete" && status == 404;
            let success = error.is_none() && ((200..300).contains(&status) || already_absent);

            if success {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
            summary.items.push(BulkItemResult {
                id,
                status,
                success,
                error: error.or_else(|| {
                    (!success).then(|| format!("Unexpected item status {}", status))
                }),
            });
        }
        summary.total = summary.items.len();

        Ok(summary)
    }

    fn error_reason(error: &Value) -> String {
        match (error["type"].as_str(), error["reason"].as_str()) {
            (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
            (None, Some(reason)) => reason.to_string(),
            _ => error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_partial_failure() {
        let response = json!({
            "took": 30,
            "errors": true,
            "items": [
                { "index": { "_index": "autocomplete", "_id": "1", "status": 201 } },
                { "index": {
                    "_index": "autocomplete",
                    "_id": "2",
                    "status": 400,
                    "error": { "type": "mapper_parsing_exception", "reason": "failed to parse field [indexed_at]" }
                } },
                { "index": { "_index": "autocomplete", "_id": "3", "status": 200 } }
            ]
        });

        let summary = BulkSummary::from_response(&response).unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(summary.has_failures());

        let failures: Vec<_> = summary.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].id, "2");
        assert_eq!(failures[0].status, 400);
        assert_eq!(
            failures[0].error.as_deref(),
            Some("mapper_parsing_exception: failed to parse field [indexed_at]")
        );
    }

    #[test]
    fn test_delete_of_missing_document_is_success() {
        let response = json!({
            "errors": false,
            "items": [{ "delete": { "_id": "9", "status": 404, "result": "not_found" } }]
        });

        let summary = BulkSummary::from_response(&response).unwrap();
        assert_eq!(summary.succeeded, 1);
        assert!(!summary.has_failures());
    }

    #[test]
    fn test_not_found_on_other_actions_is_failure() {
        let response = json!({
            "errors": true,
            "items": [
                { "update": { "_id": "4", "status": 404 } },
                { "index": { "_id": "5", "status": 404 } }
            ]
        });

        let summary = BulkSummary::from_response(&response).unwrap();
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 2);
        assert_eq!(
            summary.items[0].error.as_deref(),
            Some("Unexpected item status 404")
        );
    }

    #[test]
    fn test_missing_items_is_parse_error() {
        let result = BulkSummary::from_response(&json!({ "errors": false }));
        assert!(matches!(result, Err(SearchIndexError::ParseError(_))));
    }
}
