//! Leaderboard handler.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::actor::Actor;
use crate::api::dto::{LeaderboardParams, LeaderboardResponse};
use crate::app_state::AppState;
use crate::domain::SnapshotQuery;
use crate::error::{ClubError, ErrorResponse};

/// `GET /leaderboard` — Ranked snapshot.
///
/// # Errors
///
/// Returns [`ClubError::Privilege`] when a regular member asks for the
/// full-roster scope.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    tag = "Leaderboard",
    summary = "Leaderboard snapshot",
    description = "Members ranked by points, then seniority. Search filters after ranking, so ranks stay global.",
    params(
        ("x-actor-id" = uuid::Uuid, Header, description = "Acting member"),
        LeaderboardParams,
    ),
    responses(
        (status = 200, description = "Ranked rows", body = LeaderboardResponse),
        (status = 401, description = "Unknown actor", body = ErrorResponse),
        (status = 403, description = "Scope not permitted", body = ErrorResponse),
    )
)]
pub async fn leaderboard(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, ClubError> {
    let query = SnapshotQuery::from(params);
    let data = state.ranking.snapshot_for(actor, &query).await?;
    Ok(Json(LeaderboardResponse {
        scope: query.scope,
        data,
    }))
}

/// Leaderboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/leaderboard", get(leaderboard))
}
