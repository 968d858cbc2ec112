//! Error types for the catalog feeder and facade.

use catalog_search_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur while feeding records into the search index.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The index could not be dropped or recreated; nothing was streamed.
    #[error("Index setup failed: {0}")]
    IndexSetup(#[source] SearchIndexError),

    /// A chunk could not be formatted or submitted. Earlier chunks stay indexed.
    #[error("Chunk {chunk} ({records} records) failed: {source}")]
    ChunkFailed {
        chunk: usize,
        records: usize,
        #[source]
        source: SearchIndexError,
    },

    /// The data source could not produce the next chunk.
    #[error("Source error after {chunks_read} chunks: {message}")]
    SourceError { chunks_read: usize, message: String },

    /// A record could not be read from the source.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The feeder was configured with invalid settings.
    #[error("Invalid feeder configuration: {0}")]
    ConfigError(String),
}

impl FeedError {
    /// Create a chunk failure.
    pub fn chunk_failed(chunk: usize, records: usize, source: SearchIndexError) -> Self {
        Self::ChunkFailed {
            chunk,
            records,
            source,
        }
    }

    /// Create a source error.
    pub fn source_failed(chunks_read: usize, msg: impl Into<String>) -> Self {
        Self::SourceError {
            chunks_read,
            message: msg.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

impl From<std::io::Error> for FeedError {
    fn from(err: std::io::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}
