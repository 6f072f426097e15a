//! Service error types with HTTP status code mapping.
//!
//! [`ClubError`] is the central error type for the club ledger. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Guard rejections carry a [`PrivilegeReason`] naming the rule that failed.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Role;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 3001,
///     "message": "permission denied: members cannot change points",
///     "reason": "member_cannot_change_points"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Machine-readable guard rule identifier for privilege errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Whether the caller may retry the same request.
    pub retryable: bool,
}

/// The authorization rule a rejected request violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegeReason {
    /// Bottom-tier members may never initiate point changes.
    MemberCannotChangePoints,
    /// Only the owner may change roles.
    RoleChangeRequiresOwner,
    /// The owner role is seeded out-of-band and cannot be assigned.
    OwnerRoleNotAssignable,
    /// The owner's own assignment cannot be changed.
    TargetIsOwner,
    /// Nobody may grant themselves a role above the one they hold.
    SelfPromotion,
    /// The actor does not strictly outrank the role being assigned.
    ActorNotAboveRole,
    /// Only the top two tiers may remove members.
    RemovalRequiresBoard,
    /// The target is a peer or superior of the actor.
    TargetNotSubordinate,
    /// Profiles may only be edited by their owner.
    ProfileOwnerOnly,
    /// The full roster is only visible to privileged roles.
    RosterRequiresPrivilege,
}

impl PrivilegeReason {
    /// Returns the stable snake_case identifier for this rule.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MemberCannotChangePoints => "member_cannot_change_points",
            Self::RoleChangeRequiresOwner => "role_change_requires_owner",
            Self::OwnerRoleNotAssignable => "owner_role_not_assignable",
            Self::TargetIsOwner => "target_is_owner",
            Self::SelfPromotion => "self_promotion",
            Self::ActorNotAboveRole => "actor_not_above_role",
            Self::RemovalRequiresBoard => "removal_requires_board",
            Self::TargetNotSubordinate => "target_not_subordinate",
            Self::ProfileOwnerOnly => "profile_owner_only",
            Self::RosterRequiresPrivilege => "roster_requires_privilege",
        }
    }
}

impl fmt::Display for PrivilegeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::MemberCannotChangePoints => "members cannot change points",
            Self::RoleChangeRequiresOwner => "only the owner can change roles",
            Self::OwnerRoleNotAssignable => "the owner role cannot be assigned",
            Self::TargetIsOwner => "the owner's role cannot be changed",
            Self::SelfPromotion => "cannot assign yourself a higher role",
            Self::ActorNotAboveRole => "actor must outrank the assigned role",
            Self::RemovalRequiresBoard => "only the owner or board members can remove members",
            Self::TargetNotSubordinate => "cannot remove a peer or superior",
            Self::ProfileOwnerOnly => "profiles can only be edited by their owner",
            Self::RosterRequiresPrivilege => "the full roster requires a privileged role",
        };
        f.write_str(msg)
    }
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category         | HTTP Status                  |
/// |-----------|------------------|------------------------------|
/// | 1000–1999 | Validation       | 400 Bad Request              |
/// | 2000–2999 | State/Not Found  | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Authorization    | 403 Forbidden                |
/// | 4000–4999 | Authentication   | 401 Unauthorized             |
/// | 5000–5999 | Server / Storage | 500 / 503                    |
#[derive(Debug, thiserror::Error)]
pub enum ClubError {
    /// The referenced member, role, or record does not exist.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Kind of resource that was looked up.
        resource: &'static str,
        /// Identifier that was not found.
        id: String,
    },

    /// The authorization guard rejected the request.
    #[error("permission denied: {0}")]
    Privilege(PrivilegeReason),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A concurrent write collided with this one.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The storage backend is transiently unreachable.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Non-transient persistence failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// The request carried no usable actor identity.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ClubError {
    /// Creates a [`ClubError::NotFound`] for a member id.
    pub fn member_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            resource: "member",
            id: id.to_string(),
        }
    }

    /// Creates a [`ClubError::Conflict`] for a role that changed after the
    /// guard approved a request against it.
    pub fn role_changed(id: impl ToString, expected: Role, current: Role) -> Self {
        Self::Conflict(format!(
            "role of member {} changed from {} to {}",
            id.to_string(),
            expected.as_str(),
            current.as_str()
        ))
    }

    /// Creates a [`ClubError::Validation`] error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::NotFound { .. } => 2001,
            Self::Conflict(_) => 2002,
            Self::Privilege(_) => 3001,
            Self::Unauthenticated(_) => 4001,
            Self::Internal(_) => 5000,
            Self::StorageUnavailable(_) => 5001,
            Self::Persistence(_) => 5002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Privilege(_) => StatusCode::FORBIDDEN,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Only transient storage failures may be retried by the caller.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}

impl From<PrivilegeReason> for ClubError {
    fn from(reason: PrivilegeReason) -> Self {
        Self::Privilege(reason)
    }
}

/// Maps a sqlx error onto the service taxonomy.
///
/// Connection-level failures are transient; unique violations surface as
/// conflicts; everything else is a terminal persistence error.
pub fn map_db_error(e: sqlx::Error) -> ClubError {
    match e {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => ClubError::StorageUnavailable(e.to_string()),
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            ClubError::Conflict(db_err.message().to_string())
        }
        other => ClubError::Persistence(other.to_string()),
    }
}

impl IntoResponse for ClubError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let reason = match &self {
            Self::Privilege(reason) => Some(reason.as_str().to_string()),
            _ => None,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                reason,
                retryable: self.is_retryable(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
