//! Database row models and their conversions into domain types.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    ActionKind, ActivityRecord, Member, MemberId, MemberWithRole, Review, Role, RoleAssignment,
};
use crate::error::ClubError;

/// A row from the `members` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MemberRow {
    /// Member id.
    pub id: Uuid,
    /// Unique, normalised email.
    pub email: String,
    /// Optional display name.
    pub full_name: Option<String>,
    /// Optional avatar URL.
    pub avatar_url: Option<String>,
    /// Clamped point total.
    pub total_points: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Self {
            id: MemberId::from_uuid(row.id),
            email: row.email,
            full_name: row.full_name,
            avatar_url: row.avatar_url,
            total_points: row.total_points,
            created_at: row.created_at,
        }
    }
}

/// A `members` row left-joined with `user_roles`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MemberRoleRow {
    /// Member columns.
    #[sqlx(flatten)]
    pub member: MemberRow,
    /// Assigned role, `NULL` when unassigned.
    pub role: Option<String>,
}

impl TryFrom<MemberRoleRow> for MemberWithRole {
    type Error = ClubError;

    fn try_from(row: MemberRoleRow) -> Result<Self, Self::Error> {
        let role = match row.role.as_deref() {
            Some(r) => parse_role(r)?,
            None => Role::default(),
        };
        Ok(Self {
            member: row.member.into(),
            role,
        })
    }
}

/// A row from the `user_roles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoleRow {
    /// Member holding the role.
    pub member_id: Uuid,
    /// Role storage name.
    pub role: String,
    /// Assigning actor, `NULL` for seeded assignments.
    pub assigned_by: Option<Uuid>,
    /// Assignment time.
    pub assigned_at: DateTime<Utc>,
}

impl TryFrom<RoleRow> for RoleAssignment {
    type Error = ClubError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            member_id: MemberId::from_uuid(row.member_id),
            role: parse_role(&row.role)?,
            assigned_by: row.assigned_by.map(MemberId::from_uuid),
            assigned_at: row.assigned_at,
        })
    }
}

/// A row from the append-only `activities` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityRow {
    /// Entry id.
    pub id: Uuid,
    /// Target member (not a foreign key; survives removal).
    pub target_id: Uuid,
    /// Requested delta.
    pub delta: i64,
    /// Action kind storage name.
    pub action_kind: String,
    /// Stated reason.
    pub description: String,
    /// Actor id (not a foreign key).
    pub actor_id: Option<Uuid>,
    /// Acceptance time.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for ActivityRecord {
    type Error = ClubError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let action_kind = ActionKind::parse(&row.action_kind).ok_or_else(|| {
            ClubError::Persistence(format!("unknown action kind: {}", row.action_kind))
        })?;
        Ok(Self {
            id: row.id.into(),
            target_id: MemberId::from_uuid(row.target_id),
            delta: row.delta,
            action_kind,
            description: row.description,
            actor_id: row.actor_id.map(MemberId::from_uuid),
            created_at: row.created_at,
        })
    }
}

/// A row from the `reviews` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    /// Review id.
    pub id: Uuid,
    /// Reviewed member.
    pub target_id: Uuid,
    /// Reviewer (not a foreign key).
    pub reviewer_id: Uuid,
    /// Star rating.
    pub rating: i16,
    /// Comment text.
    pub comment: String,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = ClubError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating)
            .map_err(|_| ClubError::Persistence(format!("invalid rating: {}", row.rating)))?;
        Ok(Self {
            id: row.id.into(),
            target_id: MemberId::from_uuid(row.target_id),
            reviewer_id: MemberId::from_uuid(row.reviewer_id),
            rating,
            comment: row.comment,
            created_at: row.created_at,
        })
    }
}

pub(super) fn parse_role(s: &str) -> Result<Role, ClubError> {
    s.parse()
        .map_err(|e: crate::domain::role::ParseRoleError| ClubError::Persistence(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member_row() -> MemberRow {
        MemberRow {
            id: Uuid::new_v4(),
            email: "ada@club.org".to_string(),
            full_name: None,
            avatar_url: None,
            total_points: 12,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn missing_role_defaults_to_member() {
        let row = MemberRoleRow {
            member: member_row(),
            role: None,
        };
        let converted = MemberWithRole::try_from(row).ok().map(|m| m.role);
        assert_eq!(converted, Some(Role::Member));
    }

    #[test]
    fn unknown_role_is_a_persistence_error() {
        let row = MemberRoleRow {
            member: member_row(),
            role: Some("emperor".to_string()),
        };
        let converted = MemberWithRole::try_from(row);
        assert!(matches!(converted, Err(ClubError::Persistence(_))));
    }

    #[test]
    fn activity_row_converts() {
        let row = ActivityRow {
            id: Uuid::new_v4(),
            target_id: Uuid::new_v4(),
            delta: -15,
            action_kind: "points_removed".to_string(),
            description: "late".to_string(),
            actor_id: None,
            created_at: Utc::now(),
        };
        let record = ActivityRecord::try_from(row).ok();
        assert_eq!(record.map(|r| r.action_kind), Some(ActionKind::PointsRemoved));
    }

    #[test]
    fn negative_rating_is_rejected() {
        let row = ReviewRow {
            id: Uuid::new_v4(),
            target_id: Uuid::new_v4(),
            reviewer_id: Uuid::new_v4(),
            rating: -1,
            comment: "x".to_string(),
            created_at: Utc::now(),
        };
        assert!(Review::try_from(row).is_err());
    }
}
