//! Member records and onboarding identity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{MemberId, Role};
use crate::error::ClubError;

/// A club member as persisted by the store.
///
/// `total_points` is only ever written by the points ledger and never drops
/// below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Member {
    /// Unique member identifier (immutable after creation).
    pub id: MemberId,
    /// Normalised, unique email address.
    pub email: String,
    /// Optional display name.
    pub full_name: Option<String>,
    /// Public URL of the avatar held by external storage.
    pub avatar_url: Option<String>,
    /// Current clamped point total.
    pub total_points: i64,
    /// Creation timestamp; the leaderboard tie-breaker.
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Creates a member with zero points, stamped with the current time.
    #[must_use]
    pub fn new(identity: Identity) -> Self {
        Self {
            id: MemberId::new(),
            email: identity.email,
            full_name: identity.full_name,
            avatar_url: None,
            total_points: 0,
            created_at: Utc::now(),
        }
    }

    /// Name shown to other members: the full name, or the email when unset.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }
}

/// Member joined with its effective role, as listed on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MemberWithRole {
    /// The member record.
    #[serde(flatten)]
    pub member: Member,
    /// Effective role (default when unassigned).
    pub role: Role,
}

/// Authenticated identity delivered by the external identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Normalised email address.
    pub email: String,
    /// Display name claim, if any.
    pub full_name: Option<String>,
}

impl Identity {
    /// Normalises and validates an identity claim.
    ///
    /// The email is trimmed and lowercased and must have a non-empty local
    /// part and domain. When `allowed_domain` is set, the email domain must
    /// match it exactly.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Validation`] on a malformed email or a domain
    /// outside the allowed one.
    pub fn parse(
        email: &str,
        full_name: Option<&str>,
        allowed_domain: Option<&str>,
    ) -> Result<Self, ClubError> {
        let email = email.trim().to_lowercase();
        let Some((local, domain)) = email.split_once('@') else {
            return Err(ClubError::validation(format!("malformed email: {email}")));
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(ClubError::validation(format!("malformed email: {email}")));
        }
        if let Some(allowed) = allowed_domain
            && !domain.eq_ignore_ascii_case(allowed)
        {
            return Err(ClubError::validation(format!(
                "only @{allowed} email addresses may join"
            )));
        }
        Ok(Self {
            email,
            full_name: normalize_name(full_name),
        })
    }
}

/// Partial profile edit. `None` leaves a field untouched; `Some(None)`
/// clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New display name.
    pub full_name: Option<Option<String>>,
    /// New avatar URL from external storage.
    pub avatar_url: Option<Option<String>>,
}

impl ProfileUpdate {
    /// Builds an update from raw request fields, treating blank strings as
    /// "clear".
    #[must_use]
    pub fn from_fields(full_name: Option<&str>, avatar_url: Option<&str>) -> Self {
        Self {
            full_name: full_name.map(|n| normalize_name(Some(n))),
            avatar_url: avatar_url.map(|u| normalize_name(Some(u))),
        }
    }

    /// Returns `true` if the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.avatar_url.is_none()
    }

    /// Applies the update to a member record in place.
    pub fn apply(&self, member: &mut Member) {
        if let Some(name) = &self.full_name {
            member.full_name.clone_from(name);
        }
        if let Some(url) = &self.avatar_url {
            member.avatar_url.clone_from(url);
        }
    }
}

/// Trims a display name; blank names become `None`.
#[must_use]
pub fn normalize_name(name: Option<&str>) -> Option<String> {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}
