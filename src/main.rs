use anyhow::Context;
use job_search::{
    api::{build_router, AppState},
    config::Config,
    search::{create_index_store, JsonFileJobSource, SearchService},
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize tracing
    let json_logs = config.observability.json_logs;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "job_search={},tower_http=info",
                    config.observability.log_level
                )
                .into()
            }),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!(
        service = %config.observability.service_name,
        "Starting job search v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize the index store handle shared by every component
    tracing::info!("Index store backend: {:?}", config.index_store.backend);
    let store = create_index_store(&config.index_store)
        .await
        .context("failed to initialize index store")?;

    let source = Arc::new(JsonFileJobSource::new(config.source.path.clone()));
    tracing::info!(path = %source.path().display(), "Job source configured");

    let search = Arc::new(SearchService::new(store, source, config.search.clone()));
    let app = build_router(
        AppState::new(search),
        Duration::from_secs(config.server.request_timeout_secs),
    );

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("failed to bind {}", http_addr))?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Rebuild index: http://{}/index-jobs", http_addr);
    tracing::info!("   Search: http://{}/search-jobs?keyword=", http_addr);
    tracing::info!("   By department: http://{}/jobs-by-department?isocode=", http_addr);

    let http_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(http_listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = http_handle => {
            tracing::warn!("HTTP server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Shutting down gracefully...");
    Ok(())
}
