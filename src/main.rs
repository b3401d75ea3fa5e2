use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use htscatalog::{
    CatalogOptions, Config, build_catalog,
    handlers::{AppState, create_router},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.validate()?;

    // Index everything before binding; the toolkit calls block.
    let catalog = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || {
            let tool = config.toolkit();
            let options = CatalogOptions {
                sort_annotation: !config.no_sort,
            };
            build_catalog(&config.bam, &config.gtf, &config.fasta, &tool, options)
        })
        .await
        .context("indexing task panicked")?
        .context("failed to build the resource catalog")?
    };

    catalog
        .save(&config.catalog)
        .with_context(|| format!("failed to write {}", config.catalog.display()))?;
    tracing::info!("Catalog written to {:?}", config.catalog);

    let state = AppState {
        catalog: Arc::new(catalog),
    };

    let app = create_router(state).layer(TraceLayer::new_for_http());

    let app = if config.cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    let addr = config.bind_addr();
    tracing::info!("Starting htscatalog server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
