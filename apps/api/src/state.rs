use std::sync::Arc;

use crate::charts::repository::EpisodeRepository;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres-backed when `DATABASE_URL` is set, otherwise the sample dataset.
    pub repo: Arc<dyn EpisodeRepository>,
    pub config: Config,
}
