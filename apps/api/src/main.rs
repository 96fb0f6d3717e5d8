mod config;
mod db;
mod errors;
mod extraction;
mod intake;
mod models;
mod repository;
mod routes;
mod scoring;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::extraction::DocumentTextExtractor;
use crate::intake::orchestrator::IntakeOrchestrator;
use crate::repository::postgres::PgApplicantRepository;
use crate::repository::ApplicantRepository;
use crate::routes::build_router;
use crate::scoring::worker::spawn_scoring_worker;
use crate::state::AppState;
use crate::storage::{ArtifactStore, FsResumeStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting intake API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (pool + migrations)
    let pool = create_pool(&config.database_url).await?;

    let repository: Arc<dyn ApplicantRepository> =
        Arc::new(PgApplicantRepository::new(pool));
    let resumes: Arc<dyn ArtifactStore> =
        Arc::new(FsResumeStore::new(&config.resume_storage_root));
    info!("Resume artifact store rooted at {}", config.resume_storage_root);

    // Scoring runs on its own task, fed over a channel; an intake request
    // only ever waits on it with a bounded timeout.
    let scoring = spawn_scoring_worker(
        Arc::clone(&repository),
        Arc::new(DocumentTextExtractor),
        config.match_config,
    );
    info!("Scoring worker started");

    let intake = Arc::new(IntakeOrchestrator::new(
        Arc::clone(&repository),
        Arc::clone(&resumes),
        scoring,
        config.stage_timeout(),
        config.scoring_reply_timeout(),
    ));

    let state = AppState {
        repository,
        intake,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
