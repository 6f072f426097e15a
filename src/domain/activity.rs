//! Ledger entries recording every accepted point change.
//!
//! An [`ActivityRecord`] is created exactly once per accepted mutation and
//! never updated or deleted afterward. It stores the *requested* delta, even
//! when the zero floor clamps the member's visible total.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{ActivityId, MemberId};
use crate::error::ClubError;

/// Kind of point change, derived from the sign of the delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Positive delta.
    PointsAdded,
    /// Negative delta.
    PointsRemoved,
}

impl ActionKind {
    /// Derives the kind from a delta.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Validation`] for a zero delta.
    pub fn from_delta(delta: i64) -> Result<Self, ClubError> {
        match delta {
            0 => Err(ClubError::validation("point delta must be non-zero")),
            d if d > 0 => Ok(Self::PointsAdded),
            _ => Ok(Self::PointsRemoved),
        }
    }

    /// Returns the stable storage name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PointsAdded => "points_added",
            Self::PointsRemoved => "points_removed",
        }
    }

    /// Parses a stored action kind.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "points_added" => Some(Self::PointsAdded),
            "points_removed" => Some(Self::PointsRemoved),
            _ => None,
        }
    }
}

/// A validated point-change request, ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointChange {
    /// Member whose total changes.
    pub target_id: MemberId,
    /// Requested signed delta (non-zero).
    pub delta: i64,
    /// Kind derived from the delta sign.
    pub action_kind: ActionKind,
    /// Stated reason (trimmed, non-empty).
    pub description: String,
    /// Who requested the change.
    pub actor_id: Option<MemberId>,
}

impl PointChange {
    /// Validates the delta and description of a requested change.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Validation`] for a zero delta or a blank
    /// description.
    pub fn new(
        actor_id: Option<MemberId>,
        target_id: MemberId,
        delta: i64,
        description: &str,
    ) -> Result<Self, ClubError> {
        let action_kind = ActionKind::from_delta(delta)?;
        let description = description.trim();
        if description.is_empty() {
            return Err(ClubError::validation(
                "a description is required for every point change",
            ));
        }
        Ok(Self {
            target_id,
            delta,
            action_kind,
            description: description.to_string(),
            actor_id,
        })
    }

    /// Applies the delta to a total with the zero floor.
    #[must_use]
    pub fn apply_to(&self, current_total: i64) -> i64 {
        apply_clamped(current_total, self.delta)
    }

    /// Builds the immutable record for this change.
    #[must_use]
    pub fn into_record(self) -> ActivityRecord {
        ActivityRecord {
            id: ActivityId::new(),
            target_id: self.target_id,
            delta: self.delta,
            action_kind: self.action_kind,
            description: self.description,
            actor_id: self.actor_id,
            created_at: Utc::now(),
        }
    }
}

/// Immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ActivityRecord {
    /// Entry identifier.
    pub id: ActivityId,
    /// Member whose points changed.
    pub target_id: MemberId,
    /// Requested (unclamped) delta.
    pub delta: i64,
    /// `points_added` or `points_removed`.
    pub action_kind: ActionKind,
    /// Reason given by the actor.
    pub description: String,
    /// Who performed the change; `None` for system-originated entries.
    pub actor_id: Option<MemberId>,
    /// When the change was accepted.
    pub created_at: DateTime<Utc>,
}

/// Ledger entry with the actor's display name resolved.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActivityView {
    /// The underlying entry.
    #[serde(flatten)]
    pub record: ActivityRecord,
    /// Actor's display name, or the raw actor id if the actor was removed.
    pub actor_name: Option<String>,
}

/// Adds `delta` to `total`, flooring the result at zero.
#[must_use]
pub fn apply_clamped(total: i64, delta: i64) -> i64 {
    total.saturating_add(delta).max(0)
}

/// Folds deltas in chronological order with the per-step zero floor.
#[must_use]
pub fn fold_clamped<I>(deltas: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    deltas.into_iter().fold(0, apply_clamped)
}
