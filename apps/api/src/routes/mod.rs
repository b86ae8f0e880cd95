pub mod health;

use axum::{routing::get, Router};

use crate::charts::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Charts API
        .route("/api/v1/charts", get(handlers::handle_get_chart))
        .route("/api/v1/charts/count", get(handlers::handle_get_count))
        .route("/api/v1/scores/range", get(handlers::handle_get_score_range))
        .route("/api/v1/shows/:show_id", get(handlers::handle_get_show))
        .route(
            "/api/v1/time-window/step",
            get(handlers::handle_step_window),
        )
        .with_state(state)
}
