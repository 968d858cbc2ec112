//! # Catalog Search Repository
//!
//! This crate provides the query-building and index-administration layer on top
//! of the search engine. It includes the request parameter builder, response
//! formatting, index administration with bulk submission, record-level
//! indexing for `Indexable` types, and a concrete implementation of the engine
//! interface for OpenSearch.

pub mod admin;
pub mod bulk;
pub mod config;
pub mod errors;
pub mod index_config;
pub mod interfaces;
pub mod opensearch;
pub mod query;
pub mod record_index;
pub mod response;
pub mod service;
pub mod types;

pub use admin::IndexAdmin;
pub use bulk::BulkPayload;
pub use config::IndexAdminConfig;
pub use errors::SearchIndexError;
pub use index_config::{EdgeNgramConfig, IndexDescriptor};
pub use interfaces::SearchIndexProvider;
pub use opensearch::OpenSearchProvider;
pub use query::{MatchOptions, QueryBuilder};
pub use record_index::{RecordIndex, RecordLoader};
pub use response::SearchEnvelope;
pub use service::SearchIndexService;
pub use types::{BulkItemResult, BulkSummary};
