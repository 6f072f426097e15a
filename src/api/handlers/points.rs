//! Points handlers: guarded point changes, history, and reconciliation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::actor::Actor;
use crate::api::dto::{
    ActivityListResponse, ApplyPointsRequest, ApplyPointsResponse, PaginationParams,
};
use crate::app_state::AppState;
use crate::domain::MemberId;
use crate::error::{ClubError, ErrorResponse};

/// `POST /members/{id}/points` — Apply a signed delta.
///
/// # Errors
///
/// - [`ClubError::Privilege`] for regular members
/// - [`ClubError::Validation`] for a zero delta or missing description
/// - [`ClubError::NotFound`] for an unknown target
#[utoipa::path(
    post,
    path = "/api/v1/members/{id}/points",
    tag = "Points",
    summary = "Change a member's points",
    description = "Adds or removes points. The total is floored at zero; the ledger entry records the requested delta.",
    params(
        ("id" = uuid::Uuid, Path, description = "Member UUID"),
        ("x-actor-id" = uuid::Uuid, Header, description = "Acting member"),
    ),
    request_body = ApplyPointsRequest,
    responses(
        (status = 201, description = "Change applied", body = ApplyPointsResponse),
        (status = 400, description = "Zero delta or missing description", body = ErrorResponse),
        (status = 403, description = "Actor may not change points", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse),
    )
)]
pub async fn apply_points(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<MemberId>,
    Json(req): Json<ApplyPointsRequest>,
) -> Result<impl IntoResponse, ClubError> {
    let applied = state
        .ledger
        .apply_delta(actor, id, req.delta, &req.description)
        .await?;
    Ok((StatusCode::CREATED, Json(ApplyPointsResponse::from(applied))))
}

/// `GET /members/{id}/activities` — Paginated ledger history.
///
/// # Errors
///
/// Returns [`ClubError`] on storage failures.
#[utoipa::path(
    get,
    path = "/api/v1/members/{id}/activities",
    tag = "Points",
    summary = "Point history",
    description = "Ledger entries for a member, newest first, with actor names. History outlives the member.",
    params(
        ("id" = uuid::Uuid, Path, description = "Member UUID"),
        ("x-actor-id" = uuid::Uuid, Header, description = "Acting member"),
        PaginationParams,
    ),
    responses(
        (status = 200, description = "Paginated history", body = ActivityListResponse),
        (status = 401, description = "Unknown actor", body = ErrorResponse),
    )
)]
pub async fn list_activities(
    State(state): State<AppState>,
    Actor(_actor): Actor,
    Path(id): Path<MemberId>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ClubError> {
    let history = state.ledger.history(id).await?;
    let (data, pagination) = params.paginate(history);
    Ok(Json(ActivityListResponse { data, pagination }))
}

/// `GET /members/{id}/ledger/verify` — Replay history against the total.
///
/// # Errors
///
/// Returns [`ClubError::NotFound`] if the member does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/members/{id}/ledger/verify",
    tag = "Points",
    summary = "Reconcile the ledger",
    description = "Folds the member's history with the zero floor and compares the result with the stored total.",
    params(
        ("id" = uuid::Uuid, Path, description = "Member UUID"),
        ("x-actor-id" = uuid::Uuid, Header, description = "Acting member"),
    ),
    responses(
        (status = 200, description = "Reconciliation report", body = crate::service::LedgerReconciliation),
        (status = 401, description = "Unknown actor", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse),
    )
)]
pub async fn verify_ledger(
    State(state): State<AppState>,
    Actor(_actor): Actor,
    Path(id): Path<MemberId>,
) -> Result<impl IntoResponse, ClubError> {
    Ok(Json(state.ledger.verify(id).await?))
}

/// Points routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/members/{id}/points", post(apply_points))
        .route("/members/{id}/activities", get(list_activities))
        .route("/members/{id}/ledger/verify", get(verify_ledger))
}
