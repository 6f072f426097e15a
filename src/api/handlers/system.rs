//! Liveness endpoint, mounted outside `/api/v1` and open to anonymous callers.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Liveness report.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `healthy` when the process answers.
    pub status: &'static str,
    /// Active storage backend (`memory` or `postgres`).
    pub storage: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Server clock at response time.
    pub checked_at: DateTime<Utc>,
}

/// `GET /health` — Liveness and storage backend.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Reports liveness, the storage backend in use, and the crate version.",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        storage: state.storage,
        version: env!("CARGO_PKG_VERSION"),
        checked_at: Utc::now(),
    })
}

/// Root-level routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
