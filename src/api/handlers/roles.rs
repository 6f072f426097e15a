//! Role handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::actor::Actor;
use crate::api::dto::{RoleResponse, SetRoleRequest};
use crate::app_state::AppState;
use crate::domain::MemberId;
use crate::error::{ClubError, ErrorResponse};

/// `GET /members/{id}/role` — Effective role.
///
/// # Errors
///
/// Returns [`ClubError`] on storage failures.
#[utoipa::path(
    get,
    path = "/api/v1/members/{id}/role",
    tag = "Roles",
    summary = "Get a member's role",
    description = "Returns the assigned role, or `member` when none is assigned.",
    params(
        ("id" = uuid::Uuid, Path, description = "Member UUID"),
        ("x-actor-id" = uuid::Uuid, Header, description = "Acting member"),
    ),
    responses(
        (status = 200, description = "Effective role", body = RoleResponse),
        (status = 401, description = "Unknown actor", body = ErrorResponse),
    )
)]
pub async fn get_role(
    State(state): State<AppState>,
    Actor(_actor): Actor,
    Path(id): Path<MemberId>,
) -> Result<impl IntoResponse, ClubError> {
    let role = state.roles.get_role(id).await?;
    Ok(Json(RoleResponse {
        member_id: id,
        role,
    }))
}

/// `PUT /members/{id}/role` — Replace a member's role.
///
/// # Errors
///
/// Returns [`ClubError::Privilege`] unless the actor is the owner and the
/// requested role is below owner.
#[utoipa::path(
    put,
    path = "/api/v1/members/{id}/role",
    tag = "Roles",
    summary = "Set a member's role",
    description = "Owner only. The owner role itself cannot be assigned and owners cannot be demoted.",
    params(
        ("id" = uuid::Uuid, Path, description = "Member UUID"),
        ("x-actor-id" = uuid::Uuid, Header, description = "Acting member"),
    ),
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Role assigned", body = RoleResponse),
        (status = 403, description = "Role change not permitted", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse),
        (status = 409, description = "Target role changed concurrently", body = ErrorResponse),
    )
)]
pub async fn set_role(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<MemberId>,
    Json(req): Json<SetRoleRequest>,
) -> Result<impl IntoResponse, ClubError> {
    let assignment = state.roles.set_role(actor, id, req.role).await?;
    Ok(Json(RoleResponse {
        member_id: assignment.member_id,
        role: assignment.role,
    }))
}

/// Role routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/members/{id}/role", get(get_role).put(set_role))
}
