use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use animedex_core::{
    load_config, validate_config, CacheStore, IngestJob, JikanClient, Readiness, RemoteCatalog,
    SourceManager, SqliteCache,
};

use animedex_server::api::create_router;
use animedex_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("ANIMEDEX_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Data source strategy: {}", config.data_source.strategy.as_str());
    info!("Database path: {:?}", config.database.path);

    // Create SQLite cache
    let cache: Arc<dyn CacheStore> = Arc::new(
        SqliteCache::new(&config.database.path).context("Failed to create cache store")?,
    );
    info!("Cache store initialized");

    // Create Jikan client
    let remote: Arc<dyn RemoteCatalog> = Arc::new(
        JikanClient::new(config.jikan.clone()).context("Failed to create Jikan client")?,
    );
    info!("Remote catalog client initialized");

    // Create data source manager
    let source = Arc::new(SourceManager::new(
        Arc::clone(&remote),
        Arc::clone(&cache),
        config.data_source.clone(),
    ));

    // Create readiness holder and ingestion job
    let readiness = Arc::new(Readiness::new());
    let ingest = Arc::new(IngestJob::new(
        config.ingestion.clone(),
        remote,
        cache,
        Arc::clone(&readiness),
    ));

    // Kick off the initial load
    if config.ingestion.run_on_startup {
        info!("Starting initial ingestion run");
        if let Err(e) = ingest.try_start() {
            error!("Could not start initial ingestion run: {}", e);
        }
    } else {
        info!("Ingestion on startup disabled, catalog routes stay gated until a manual reload");
    }

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        source,
        Arc::clone(&ingest),
        readiness,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
