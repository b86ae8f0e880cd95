mod charts;
mod config;
mod db;
mod errors;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::charts::repository::{EpisodeRepository, MemoryEpisodeRepository, PgEpisodeRepository};
use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Podcast Charts API v{}", env!("CARGO_PKG_VERSION"));
    info!("Score strategy: {}", config.score_strategy);

    // Pick the episode source
    let repo: Arc<dyn EpisodeRepository> = match &config.database_url {
        Some(url) => {
            let db = create_pool(url, config.db_max_connections).await?;
            Arc::new(PgEpisodeRepository::new(db))
        }
        None => {
            warn!("DATABASE_URL not set, serving the bundled sample episodes");
            Arc::new(MemoryEpisodeRepository::with_sample_data())
        }
    };

    // Build app state
    let state = AppState {
        repo,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
