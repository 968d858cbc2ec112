//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use std::time::Duration;

use async_trait::async_trait;
use opensearch::{
    http::{
        request::JsonBody,
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts},
    BulkParts, DeleteParts, GetParts, IndexParts, OpenSearch, SearchParts,
};
use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;

/// OpenSearch provider implementation.
///
/// Speaks the engine's JSON-over-HTTP API through the `opensearch` client.
/// The provider is index-agnostic: every call names the index it targets.
///
/// # Example
///
/// ```ignore
/// let provider = OpenSearchProvider::new("http://localhost:9200", None).await?;
/// provider.check_connection().await?;
/// let exists = provider.index_exists("autocomplete").await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `timeout` - Optional per-request transport timeout
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(url: &str, timeout: Option<Duration>) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let transport = builder
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, timeout = ?timeout, "Created OpenSearch provider");

        Ok(Self { client })
    }

    /// Ping the cluster to verify it is reachable.
    pub async fn check_connection(&self) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(SearchIndexError::connection(format!(
                "Ping failed with status {}",
                status
            )));
        }
        Ok(())
    }

    /// Read the status and body of a failed response for error reporting.
    async fn failure_message(response: Response, operation: &str) -> String {
        let status = response.status_code();
        let error_body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %error_body, operation, "Request failed");
        format!("{} failed with status {}: {}", operation, status, error_body)
    }

    async fn read_json(response: Response) -> Result<Value, SearchIndexError> {
        response
            .json::<Value>()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            return Ok(true);
        }
        if status.as_u16() == 404 {
            return Ok(false);
        }
        Err(SearchIndexError::search(
            Self::failure_message(response, "Index exists check").await,
        ))
    }

    async fn create_index(&self, index: &str, body: &Value) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(body.clone())
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(SearchIndexError::index_creation(
                Self::failure_message(response, "Index creation").await,
            ));
        }

        info!(index = %index, "Index created");
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - index may not exist
        if status.as_u16() == 404 {
            debug!(index = %index, "Index already absent");
            return Ok(false);
        }
        if !status.is_success() {
            return Err(SearchIndexError::index_deletion(
                Self::failure_message(response, "Index deletion").await,
            ));
        }

        info!(index = %index, "Index deleted");
        Ok(true)
    }

    async fn search(&self, index: &str, body: &Value) -> Result<Value, SearchIndexError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(body.clone())
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(SearchIndexError::search(
                Self::failure_message(response, "Search").await,
            ));
        }

        Self::read_json(response).await
    }

    async fn get_document(&self, index: &str, id: &str) -> Result<Option<Value>, SearchIndexError> {
        let response = self
            .client
            .get(GetParts::IndexId(index, id))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SearchIndexError::search(
                Self::failure_message(response, "Get document").await,
            ));
        }

        let body = Self::read_json(response).await?;
        if body["found"].as_bool() != Some(true) {
            return Ok(None);
        }
        Ok(body.get("_source").cloned())
    }

    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        body: &Value,
    ) -> Result<(), SearchIndexError> {
        let parts = match id {
            Some(id) => IndexParts::IndexId(index, id),
            None => IndexParts::Index(index),
        };

        let response = self
            .client
            .index(parts)
            .body(body.clone())
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(SearchIndexError::index(
                Self::failure_message(response, "Index document").await,
            ));
        }

        debug!(index = %index, id = ?id, "Document indexed");
        Ok(())
    }

    async fn delete_document(&self, index: &str, id: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index, id))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - document may not exist
        if status.as_u16() == 404 {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(SearchIndexError::delete(
                Self::failure_message(response, "Delete document").await,
            ));
        }

        debug!(index = %index, id = %id, "Document deleted");
        Ok(true)
    }

    async fn bulk(&self, index: &str, operations: Vec<Value>) -> Result<Value, SearchIndexError> {
        let count = operations.len();
        let body: Vec<JsonBody<Value>> = operations.into_iter().map(JsonBody::new).collect();

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(SearchIndexError::bulk_index(
                Self::failure_message(response, "Bulk").await,
            ));
        }

        debug!(index = %index, operations = count, "Bulk request accepted");
        Self::read_json(response).await
    }
}
