use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tripscout_core::{
    create_llm_client, load_config, metrics as core_metrics, validate_config, BrowserDriver,
    Extractor, InMemoryTaskStore, LlmPageExtractor, PipelineDeps, Pipelines, SanitizedConfig,
    TaskStore, TranscriptSource, WebDriverBrowser, WorkerPool, YoutubeTranscriptSource,
};
use tripscout_server::{create_router, AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
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
    let config_path = std::env::var("TRIPSCOUT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    match serde_json::to_string(&SanitizedConfig::from(&config)) {
        Ok(sanitized) => info!(config = %sanitized, "Effective configuration"),
        Err(e) => warn!(error = %e, "Could not render configuration"),
    }

    // External collaborators
    let llm = create_llm_client(&config.llm).context("Failed to create LLM client")?;
    info!(
        "Using LLM provider {:?} with model {}",
        config.llm.provider, config.llm.model
    );

    let browser: Arc<dyn BrowserDriver> = Arc::new(WebDriverBrowser::new(config.browser.clone()));
    info!("Browser automation via {}", config.browser.webdriver_url);

    let extractor: Arc<dyn Extractor> = Arc::new(
        LlmPageExtractor::new(Arc::clone(&browser), Arc::clone(&llm))
            .with_settle(config.browser.page_load_wait())
            .with_max_tokens(config.llm.max_tokens),
    );

    let transcripts: Arc<dyn TranscriptSource> =
        Arc::new(YoutubeTranscriptSource::new(config.transcripts.clone()));

    // Task store and worker pool
    let store = Arc::new(InMemoryTaskStore::new(config.task_store.clone()));
    let pool = Arc::new(WorkerPool::new(
        config.workers.clone(),
        Arc::clone(&store) as Arc<dyn TaskStore>,
    ));
    info!(
        "Worker pool ready: {} workers, {} queue slots",
        config.workers.max_concurrent, config.workers.queue_capacity
    );

    let pipelines = Pipelines::new(PipelineDeps {
        browser,
        extractor,
        llm,
        transcripts,
        browser_config: config.browser.clone(),
        sites: config.sites.clone(),
    });

    // Spawn expired-task sweeper
    let sweep_interval = Duration::from_secs(config.task_store.sweep_interval_secs);
    let sweeper_store = Arc::clone(&store);
    let sweeper_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            match sweeper_store.purge_expired() {
                Ok(0) => {}
                Ok(purged) => core_metrics::TASKS_EXPIRED.inc_by(purged as u64),
                Err(e) => warn!(error = %e, "Task sweep failed"),
            }
        }
    });

    let addr = SocketAddr::new(config.server.host, config.server.port);

    let state = Arc::new(AppState::new(
        config,
        store as Arc<dyn TaskStore>,
        Arc::clone(&pool),
        pipelines,
    ));
    let app = create_router(state);

    // Start server
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down worker pool...");
    pool.shutdown();
    sweeper_handle.abort();

    info!("Server shutdown complete");
    Ok(())
}

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

    info!("Shutdown signal received");
}
