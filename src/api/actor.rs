//! Acting-member extractor.
//!
//! The identity service authenticates the caller upstream and forwards the
//! member id in the `x-actor-id` header. Every guarded handler takes an
//! [`Actor`] so the actor is always an explicit argument, and the id is
//! resolved against the member directory before the handler runs.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::domain::MemberId;
use crate::error::ClubError;

/// Header carrying the authenticated member id.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Authenticated member making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub MemberId);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ClubError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let id = header_id(parts)?;
        let app_state = AppState::from_ref(state);
        let party = app_state.roles.actor(id).await.inspect_err(|e| {
            tracing::warn!(actor = %id, error = %e, "actor rejected");
        })?;
        Ok(Self(party.id))
    }
}

/// Reads the member id from the actor header.
fn header_id(parts: &Parts) -> Result<MemberId, ClubError> {
    let raw = parts
        .headers
        .get(ACTOR_HEADER)
        .ok_or_else(|| ClubError::Unauthenticated(format!("missing {ACTOR_HEADER} header")))?
        .to_str()
        .map_err(|_| ClubError::Unauthenticated(format!("{ACTOR_HEADER} is not ASCII")))?;

    raw.trim().parse::<MemberId>().map_err(|e| {
        tracing::warn!(error = %e, "invalid actor header");
        ClubError::Unauthenticated(format!("{ACTOR_HEADER} is not a member id"))
    })
}
