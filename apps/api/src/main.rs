mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod optimization;
mod render;
mod routes;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{ArtifactBackend, Config};
use crate::db::{create_pool, PgSessionStore, SessionStore};
use crate::llm_client::LlmClient;
use crate::optimization::{recover_interrupted, JobQueue, Pipeline};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{ArtifactStore, LocalArtifactStore, S3ArtifactStore, UploadStaging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Optimizer API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url).await?;
    let store: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(pool));

    // Sessions left mid-flight by a previous process cannot be resumed
    recover_interrupted(store.as_ref()).await?;

    // Initialize artifact storage
    let artifacts: Arc<dyn ArtifactStore> = match &config.artifact_backend {
        ArtifactBackend::Local => {
            info!("Local artifact store at {}", config.output_dir.display());
            Arc::new(LocalArtifactStore::new(config.output_dir.clone()))
        }
        ArtifactBackend::S3(settings) => Arc::new(S3ArtifactStore::connect(settings).await),
    };
    let staging = UploadStaging::new(config.upload_dir.clone());

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.llm_max_attempts)?;
    info!(
        "LLM client initialized (model: {}, attempts: {})",
        llm_client::MODEL,
        config.llm_max_attempts
    );

    // Start the job queue
    let pipeline = Arc::new(Pipeline::new(
        store.clone(),
        Arc::new(llm),
        artifacts.clone(),
        staging.clone(),
    ));
    let (queue, _dispatcher) = JobQueue::start(pipeline, config.max_concurrent_sessions);
    info!(
        "Job queue started (max concurrent sessions: {})",
        config.max_concurrent_sessions
    );

    // Build app state
    let state = AppState {
        store,
        artifacts,
        staging,
        queue,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
