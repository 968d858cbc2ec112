//! Catalog Search Main Entry Point
//!
//! Usage:
//!
//! - `catalog-search` or `catalog-search reindex`: rebuild the index from `FEEDER_SOURCE_PATH`
//! - `catalog-search complete <prefix>`: print autocomplete suggestions
//! - `catalog-search search <text> [size]`: print matching documents

use catalog_search::{CatalogSearchError, Dependencies, JsonLinesSource};
use catalog_search_shared::AutoCompleteDocument;
use dotenv::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("catalog_search=info,catalog_search_repository=info"));

    let json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();

        info!(
            service_name = "catalog-search",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();

        info!(
            service_name = "catalog-search",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }
}

async fn reindex(deps: &mut Dependencies) -> Result<(), CatalogSearchError> {
    let path = deps
        .settings
        .source_path
        .clone()
        .ok_or_else(|| CatalogSearchError::config("FEEDER_SOURCE_PATH is not set"))?;

    let mut source = JsonLinesSource::<AutoCompleteDocument>::open(&path).await?;
    let report = deps.feeder.sync(&mut source).await?;

    for item in &report.failed_items {
        error!(chunk = item.chunk, id = %item.id, reason = %item.reason, "Document rejected");
    }
    info!(
        run_id = %report.run_id,
        records = report.records,
        indexed = report.indexed,
        "Reindex finished"
    );
    Ok(())
}

async fn complete(deps: &Dependencies, prefix: Option<&str>) -> Result<(), CatalogSearchError> {
    let titles = deps.facade.auto_complete(prefix.unwrap_or_default()).await?;
    for title in titles {
        println!("{}", title);
    }
    Ok(())
}

async fn search(
    deps: &Dependencies,
    text: Option<&str>,
    size: Option<&String>,
) -> Result<(), CatalogSearchError> {
    let size = size
        .and_then(|s| s.parse().ok())
        .unwrap_or(deps.settings.autocomplete_size);
    let documents = deps.facade.look_for(text.unwrap_or_default(), size).await?;
    for document in documents {
        println!("{}", document);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), CatalogSearchError> {
    dotenv().ok();
    init_tracing();

    info!("Starting catalog search");

    let mut deps = match Dependencies::new().await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        None | Some("reindex") => reindex(&mut deps).await,
        Some("complete") => complete(&deps, args.get(1).map(String::as_str)).await,
        Some("search") => search(&deps, args.get(1).map(String::as_str), args.get(2)).await,
        Some(other) => Err(CatalogSearchError::config(format!(
            "Unknown command '{}'; expected reindex, complete or search",
            other
        ))),
    };

    match result {
        Ok(()) => {
            info!("Catalog search completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Catalog search failed");
            Err(e)
        }
    }
}
