//! Member handlers: onboarding, roster, detail, profile edits, removal, and
//! the signed-in landing view.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::actor::Actor;
use crate::api::dto::{CreateMemberRequest, MeResponse, RosterResponse, UpdateProfileRequest};
use crate::app_state::AppState;
use crate::domain::{LeaderboardScope, MemberId, ProfileUpdate, SnapshotQuery};
use crate::error::{ClubError, ErrorResponse};

/// `POST /members` — Onboard an authenticated identity.
///
/// # Errors
///
/// Returns [`ClubError::Validation`] for an email outside the allowed domain.
#[utoipa::path(
    post,
    path = "/api/v1/members",
    tag = "Members",
    summary = "Onboard a member",
    description = "Creates a member with zero points and the default role. Idempotent on email: repeating the call returns the existing record.",
    request_body = CreateMemberRequest,
    responses(
        (status = 201, description = "Member record", body = crate::domain::Member),
        (status = 400, description = "Malformed or disallowed email", body = ErrorResponse),
    )
)]
pub async fn create_member(
    State(state): State<AppState>,
    Json(req): Json<CreateMemberRequest>,
) -> Result<impl IntoResponse, ClubError> {
    let member = state
        .members
        .create(&req.email, req.full_name.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// `GET /members` — Full roster with roles.
///
/// # Errors
///
/// Returns [`ClubError::Privilege`] for regular members.
#[utoipa::path(
    get,
    path = "/api/v1/members",
    tag = "Members",
    summary = "List the roster",
    description = "Every member with their role, oldest first. Restricted to privileged roles.",
    params(("x-actor-id" = uuid::Uuid, Header, description = "Acting member")),
    responses(
        (status = 200, description = "Roster", body = RosterResponse),
        (status = 403, description = "Actor is not privileged", body = ErrorResponse),
    )
)]
pub async fn list_members(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Result<impl IntoResponse, ClubError> {
    let data = state.members.roster(actor).await?;
    Ok(Json(RosterResponse { data }))
}

/// `GET /members/{id}` — Member detail.
///
/// # Errors
///
/// Returns [`ClubError::NotFound`] if the member does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/members/{id}",
    tag = "Members",
    summary = "Get a member",
    description = "Profile, role, and current total of one member.",
    params(
        ("id" = uuid::Uuid, Path, description = "Member UUID"),
        ("x-actor-id" = uuid::Uuid, Header, description = "Acting member"),
    ),
    responses(
        (status = 200, description = "Member detail", body = crate::domain::MemberWithRole),
        (status = 401, description = "Unknown actor", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse),
    )
)]
pub async fn get_member(
    State(state): State<AppState>,
    Actor(_actor): Actor,
    Path(id): Path<MemberId>,
) -> Result<impl IntoResponse, ClubError> {
    Ok(Json(state.members.detail(id).await?))
}

/// `PATCH /members/{id}` — Edit one's own profile.
///
/// # Errors
///
/// Returns [`ClubError::Privilege`] when editing someone else.
#[utoipa::path(
    patch,
    path = "/api/v1/members/{id}",
    tag = "Members",
    summary = "Update a profile",
    description = "Sets the display name and avatar URL. Only the member themself may edit; blank values clear a field.",
    params(
        ("id" = uuid::Uuid, Path, description = "Member UUID"),
        ("x-actor-id" = uuid::Uuid, Header, description = "Acting member"),
    ),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated member", body = crate::domain::Member),
        (status = 400, description = "Empty update", body = ErrorResponse),
        (status = 403, description = "Not the actor's profile", body = ErrorResponse),
    )
)]
pub async fn update_member(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<MemberId>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ClubError> {
    let update = ProfileUpdate::from_fields(req.full_name.as_deref(), req.avatar_url.as_deref());
    let member = state.members.update_profile(actor, id, update).await?;
    Ok(Json(member))
}

/// `DELETE /members/{id}` — Remove a member.
///
/// # Errors
///
/// Returns [`ClubError::Privilege`] unless the actor is board tier or above
/// and outranks the target.
#[utoipa::path(
    delete,
    path = "/api/v1/members/{id}",
    tag = "Members",
    summary = "Remove a member",
    description = "Deletes the member and their role assignment. Ledger history is kept.",
    params(
        ("id" = uuid::Uuid, Path, description = "Member UUID"),
        ("x-actor-id" = uuid::Uuid, Header, description = "Acting member"),
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Removal not permitted", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse),
        (status = 409, description = "Target role changed concurrently", body = ErrorResponse),
    )
)]
pub async fn delete_member(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<MemberId>,
) -> Result<impl IntoResponse, ClubError> {
    state.members.remove(actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /me` — Landing view for the signed-in member.
///
/// # Errors
///
/// Returns [`ClubError::Unauthenticated`] if the actor is not a member.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "Members",
    summary = "Signed-in landing view",
    description = "The actor's profile and role, the console they land on, and the top of the public leaderboard.",
    params(("x-actor-id" = uuid::Uuid, Header, description = "Acting member")),
    responses(
        (status = 200, description = "Landing view", body = MeResponse),
        (status = 401, description = "Unknown actor", body = ErrorResponse),
    )
)]
pub async fn me(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Result<impl IntoResponse, ClubError> {
    let (profile, landing_view) = state.members.landing(actor).await?;
    let query = SnapshotQuery {
        scope: LeaderboardScope::MembersOnly,
        search: None,
        limit: Some(state.dashboard_top_n),
    };
    let leaderboard = state.ranking.snapshot(&query).await?;
    Ok(Json(MeResponse {
        profile,
        landing_view,
        leaderboard,
    }))
}

/// Member routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/members", post(create_member).get(list_members))
        .route(
            "/members/{id}",
            get(get_member).patch(update_member).delete(delete_member),
        )
        .route("/me", get(me))
}
