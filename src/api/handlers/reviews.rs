//! Review handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::actor::Actor;
use crate::api::dto::{ReviewListResponse, SubmitReviewRequest};
use crate::app_state::AppState;
use crate::domain::MemberId;
use crate::error::{ClubError, ErrorResponse};

/// `POST /members/{id}/reviews` — Review another member.
///
/// # Errors
///
/// Returns [`ClubError::Validation`] for a self-review, rating outside
/// `1..=5`, or blank comment.
#[utoipa::path(
    post,
    path = "/api/v1/members/{id}/reviews",
    tag = "Reviews",
    summary = "Submit a review",
    request_body = SubmitReviewRequest,
    params(
        ("id" = uuid::Uuid, Path, description = "Reviewed member UUID"),
        ("x-actor-id" = uuid::Uuid, Header, description = "Reviewer"),
    ),
    responses(
        (status = 201, description = "Review stored", body = crate::domain::Review),
        (status = 400, description = "Invalid review", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse),
    )
)]
pub async fn submit_review(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<MemberId>,
    Json(req): Json<SubmitReviewRequest>,
) -> Result<impl IntoResponse, ClubError> {
    let review = state
        .reviews
        .submit(actor, id, req.rating, &req.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// `GET /members/{id}/reviews` — Reviews and rating summary.
///
/// # Errors
///
/// Returns [`ClubError`] on storage failures.
#[utoipa::path(
    get,
    path = "/api/v1/members/{id}/reviews",
    tag = "Reviews",
    summary = "List reviews",
    params(
        ("id" = uuid::Uuid, Path, description = "Reviewed member UUID"),
        ("x-actor-id" = uuid::Uuid, Header, description = "Acting member"),
    ),
    responses(
        (status = 200, description = "Reviews, newest first", body = ReviewListResponse),
        (status = 401, description = "Unknown actor", body = ErrorResponse),
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Actor(_actor): Actor,
    Path(id): Path<MemberId>,
) -> Result<impl IntoResponse, ClubError> {
    let data = state.reviews.list(id).await?;
    let summary = state.reviews.summary(id).await?;
    Ok(Json(ReviewListResponse { summary, data }))
}

/// Review routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/members/{id}/reviews",
        post(submit_review).get(list_reviews),
    )
}
