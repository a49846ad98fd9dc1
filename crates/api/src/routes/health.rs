use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Number of registered players.
    pub players: usize,
    /// Restore notifications that have not fired yet.
    pub pending_timers: usize,
}

/// GET / -- bare liveness probe for the hosting platform.
async fn liveness() -> &'static str {
    "OK"
}

/// GET /health -- service status with a few state counters.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let players = state.roster.lock().await.players().len();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        players,
        pending_timers: state.scheduler.in_flight(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health_check))
}
