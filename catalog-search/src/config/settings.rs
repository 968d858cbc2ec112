//! Runtime settings read from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use catalog_search_repository::config::MAX_SETTLE_DELAY;
use catalog_search_repository::index_config::AUTOCOMPLETE_INDEX_NAME;
use catalog_search_repository::{EdgeNgramConfig, IndexAdminConfig};
use tracing::warn;

use crate::facade::{FacadeConfig, DEFAULT_AUTOCOMPLETE_SIZE};
use crate::feeder::{FeederConfig, DEFAULT_CHUNK_SIZE};

/// Default OpenSearch URL.
pub const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default connection retry interval in seconds.
pub const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Connection mode for OpenSearch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry the connection at a fixed interval until it succeeds.
    Retry,
}

impl ConnectionMode {
    /// Parse a connection mode.
    ///
    /// Valid values: "fail-fast" or "retry" (case-insensitive).
    /// Anything else falls back to "retry".
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "retry".to_string())
            .to_lowercase()
            .as_str()
        {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            _ => {
                warn!("Invalid OPENSEARCH_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }
}

/// Everything the binary reads from its environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub opensearch_url: String,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
    /// Transport timeout; `None` keeps the client default.
    pub timeout: Option<Duration>,
    pub index_name: String,
    pub chunk_size: usize,
    /// JSON-lines export to feed from.
    pub source_path: Option<PathBuf>,
    pub settle_delay: Duration,
    pub ngram: EdgeNgramConfig,
    pub autocomplete_size: usize,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_CONNECTION_MODE`: "fail-fast" or "retry" (default: retry)
    /// - `OPENSEARCH_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `OPENSEARCH_TIMEOUT_SECS`: Transport timeout in seconds (default: none)
    /// - `SEARCH_INDEX_NAME`: Index to feed and query (default: autocomplete)
    /// - `FEEDER_CHUNK_SIZE`: Records per bulk request (default: 100)
    /// - `FEEDER_SOURCE_PATH`: JSON-lines file of records to feed
    /// - `INDEX_SETTLE_DELAY_SECS`: Pause between index drop and create (default: 0, max 60)
    /// - `AUTOCOMPLETE_MIN_GRAM` / `AUTOCOMPLETE_MAX_GRAM`: Edge-n-gram bounds (default: 1 / 20)
    /// - `AUTOCOMPLETE_SIZE`: Suggestions per lookup (default: 10)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the value of a variable if set.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = EdgeNgramConfig::default();
        let settle_secs: u64 = parse_or(&lookup, "INDEX_SETTLE_DELAY_SECS", 0);

        Self {
            opensearch_url: lookup("OPENSEARCH_URL")
                .unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string()),
            connection_mode: ConnectionMode::parse(lookup("OPENSEARCH_CONNECTION_MODE")),
            retry_interval: Duration::from_secs(parse_or(
                &lookup,
                "OPENSEARCH_RETRY_INTERVAL_SECS",
                DEFAULT_RETRY_INTERVAL_SECS,
            )),
            timeout: lookup("OPENSEARCH_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs),
            index_name: lookup("SEARCH_INDEX_NAME")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| AUTOCOMPLETE_INDEX_NAME.to_string()),
            chunk_size: parse_or(&lookup, "FEEDER_CHUNK_SIZE", DEFAULT_CHUNK_SIZE),
            source_path: lookup("FEEDER_SOURCE_PATH").map(PathBuf::from),
            settle_delay: Duration::from_secs(settle_secs).min(MAX_SETTLE_DELAY),
            ngram: EdgeNgramConfig::new(
                parse_or(&lookup, "AUTOCOMPLETE_MIN_GRAM", defaults.min_gram),
                parse_or(&lookup, "AUTOCOMPLETE_MAX_GRAM", defaults.max_gram),
            ),
            autocomplete_size: parse_or(&lookup, "AUTOCOMPLETE_SIZE", DEFAULT_AUTOCOMPLETE_SIZE),
        }
    }

    pub fn admin_config(&self) -> IndexAdminConfig {
        IndexAdminConfig::default().with_settle_delay(self.settle_delay)
    }

    pub fn feeder_config(&self) -> FeederConfig {
        FeederConfig::default().with_chunk_size(self.chunk_size)
    }

    pub fn facade_config(&self) -> FacadeConfig {
        FacadeConfig::default().with_autocomplete_size(self.autocomplete_size)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(variable = key, value = %raw, "Invalid value, using default");
            default
        }),
    }
}
