//! Member-related DTOs: onboarding, profile edits, roster, and `/me`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{LandingView, LeaderboardEntry, MemberWithRole};

/// Request body for `POST /members`, relayed from the identity service.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateMemberRequest {
    /// Authenticated email address.
    pub email: String,
    /// Display name claim.
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Request body for `PATCH /members/{id}`.
///
/// Omitted fields are left unchanged; blank strings clear the field.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    /// New display name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Public URL of an avatar already uploaded to external storage.
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Response body for `GET /members`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RosterResponse {
    /// Every member with their role, oldest first.
    pub data: Vec<MemberWithRole>,
}

/// Response body for `GET /me`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    /// The actor's own record and role.
    pub profile: MemberWithRole,
    /// Console the actor lands on.
    pub landing_view: LandingView,
    /// Top of the public leaderboard.
    pub leaderboard: Vec<LeaderboardEntry>,
}
