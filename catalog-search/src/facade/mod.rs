//! Public lookup entry points over the autocomplete index.

use catalog_search_repository::{SearchIndexError, SearchIndexService};
use serde_json::Value;
use tracing::{debug, instrument};

/// Default number of suggestions returned by [`SearchFacade::auto_complete`].
pub const DEFAULT_AUTOCOMPLETE_SIZE: usize = 10;

/// Hits requested per page, as a multiple of the suggestions wanted.
pub const AUTOCOMPLETE_FETCH_FACTOR: usize = 3;

/// Upper bound on pages read for one autocomplete lookup.
pub const MAX_AUTOCOMPLETE_PAGES: usize = 4;

/// Configuration for the facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacadeConfig {
    /// Maximum number of suggestions per autocomplete lookup.
    pub autocomplete_size: usize,
    /// Field matched against and returned as the suggestion text.
    pub title_field: String,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            autocomplete_size: DEFAULT_AUTOCOMPLETE_SIZE,
            title_field: "title".to_string(),
        }
    }
}

impl FacadeConfig {
    pub fn with_autocomplete_size(mut self, size: usize) -> Self {
        self.autocomplete_size = size;
        self
    }
}

/// Search facade.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use catalog_search::facade::{FacadeConfig, SearchFacade};
/// use catalog_search_repository::{OpenSearchProvider, SearchIndexService};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Arc::new(OpenSearchProvider::new("http://localhost:9200", None).await?);
/// let facade = SearchFacade::new(
///     SearchIndexService::new(provider, "autocomplete"),
///     FacadeConfig::default(),
/// );
///
/// let titles = facade.auto_complete("cas").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SearchFacade {
    service: SearchIndexService,
    config: FacadeConfig,
}

impl SearchFacade {
    pub fn new(service: SearchIndexService, config: FacadeConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }

    /// Documents whose title matches `query`, best match first, at most `size`.
    #[instrument(skip(self), fields(index = %self.service.index_name()))]
    pub async fn look_for(&self, query: &str, size: usize) -> Result<Vec<Value>, SearchIndexError> {
        let mut request = self.service.query();
        request
            .add_match(self.config.title_field.as_str(), query)
            .set_limit(size);
        self.service.get(&mut request).await
    }

    /// Distinct titles matching the typed prefix, in relevance order.
    ///
    /// Hits are fetched in pages of `autocomplete_size * AUTOCOMPLETE_FETCH_FACTOR`
    /// until enough distinct titles are collected, the hits run out, or
    /// [`MAX_AUTOCOMPLETE_PAGES`] pages were read. A blank prefix yields no
    /// suggestions without querying the engine.
    pub async fn auto_complete(&self, query: &str) -> Result<Vec<String>, SearchIndexError> {
        let query = query.trim();
        let wanted = self.config.autocomplete_size;
        if query.is_empty() || wanted == 0 {
            return Ok(Vec::new());
        }

        let batch = wanted.saturating_mul(AUTOCOMPLETE_FETCH_FACTOR);
        let mut titles: Vec<String> = Vec::with_capacity(wanted);
        let mut offset = 0;

        for _ in 0..MAX_AUTOCOMPLETE_PAGES {
            let mut request = self.service.query();
            request
                .add_match(self.config.title_field.as_str(), query)
                .set_offset(offset)
                .set_limit(batch);
            let documents = self.service.get(&mut request).await?;

            for title in documents
                .iter()
                .filter_map(|doc| doc.get(&self.config.title_field)?.as_str())
            {
                if titles.len() == wanted {
                    break;
                }
                if !titles.iter().any(|seen| seen == title) {
                    titles.push(title.to_string());
                }
            }

            if titles.len() == wanted || documents.len() < batch {
                break;
            }
            offset += documents.len();
        }

        debug!(prefix = %query, suggestions = titles.len(), "Autocomplete lookup");
        Ok(titles)
    }
}
