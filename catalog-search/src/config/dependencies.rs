//! Dependency initialization and wiring for catalog search.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::settings::{ConnectionMode, Settings};
use crate::facade::SearchFacade;
use crate::feeder::Feeder;
use crate::CatalogSearchError;
use catalog_search_repository::{
    IndexAdmin, IndexDescriptor, OpenSearchProvider, SearchIndexProvider, SearchIndexService,
};

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub settings: Settings,
    /// Feeder that rebuilds the configured index.
    pub feeder: Feeder,
    /// Lookup entry points over the same index.
    pub facade: SearchFacade,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`Settings::from_env`] for the variables read.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(CatalogSearchError)` - If initialization fails; connection errors only
    ///   fail in fail-fast mode
    pub async fn new() -> Result<Self, CatalogSearchError> {
        Self::from_settings(Settings::from_env()).await
    }

    /// Connect to OpenSearch and wire the feeder and facade for `settings`.
    pub async fn from_settings(settings: Settings) -> Result<Self, CatalogSearchError> {
        info!(
            opensearch_url = %settings.opensearch_url,
            index = %settings.index_name,
            connection_mode = ?settings.connection_mode,
            retry_interval_secs = settings.retry_interval.as_secs(),
            "Initializing dependencies"
        );

        let provider = Self::connect_to_opensearch(
            &settings.opensearch_url,
            settings.timeout,
            settings.connection_mode,
            settings.retry_interval,
        )
        .await?;

        info!("OpenSearch connection established");

        Self::with_provider(settings, Arc::new(provider))
    }

    /// Wire the feeder and facade on top of an existing provider.
    pub fn with_provider(
        settings: Settings,
        provider: Arc<dyn SearchIndexProvider>,
    ) -> Result<Self, CatalogSearchError> {
        let descriptor = IndexDescriptor::autocomplete(settings.index_name.clone(), &settings.ngram)
            .map_err(|e| CatalogSearchError::config(format!("Invalid index settings: {}", e)))?;

        let admin = IndexAdmin::with_config(provider.clone(), settings.admin_config());
        let feeder = Feeder::with_config(admin, descriptor, settings.feeder_config());
        let facade = SearchFacade::new(
            SearchIndexService::new(provider, settings.index_name.clone()),
            settings.facade_config(),
        );

        Ok(Self {
            settings,
            feeder,
            facade,
        })
    }

    /// Connect to OpenSearch with retry logic based on connection mode.
    async fn connect_to_opensearch(
        url: &str,
        timeout: Option<Duration>,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<OpenSearchProvider, CatalogSearchError> {
        loop {
            match Self::try_connect_opensearch(url, timeout).await {
                Ok(provider) => return Ok(provider),
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(CatalogSearchError::config(format!(
                            "Failed to connect to OpenSearch: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            opensearch_url = %url,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to OpenSearch, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }

    /// Attempt to connect to OpenSearch and ping the cluster.
    async fn try_connect_opensearch(
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<OpenSearchProvider, CatalogSearchError> {
        let provider = OpenSearchProvider::new(url, timeout).await?;
        provider.check_connection().await?;
        Ok(provider)
    }
}
