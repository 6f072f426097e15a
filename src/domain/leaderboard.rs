//! Deterministic, tie-broken leaderboard ranking.
//!
//! Ranking is a pure function of member totals: points descending, then
//! earliest `created_at`, then member id. Ranks are `1..=N` with no gaps and
//! no shared positions, regardless of the order the store returned rows in.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Member, MemberWithRole, Role};

/// Which members a snapshot includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardScope {
    /// Every member regardless of role (admin roster view).
    All,
    /// Only members holding the default role (public view).
    #[default]
    MembersOnly,
}

impl LeaderboardScope {
    /// Returns `true` if a member with `role` belongs in this scope.
    #[must_use]
    pub fn includes(self, role: Role) -> bool {
        match self {
            Self::All => true,
            Self::MembersOnly => role == Role::LOWEST,
        }
    }
}

/// Derived leaderboard row. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: u32,
    /// Member snapshot at read time.
    #[serde(flatten)]
    pub member: Member,
    /// Effective role at read time.
    pub role: Role,
}

/// Optional filters applied to a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotQuery {
    /// Which roles are ranked.
    pub scope: LeaderboardScope,
    /// Case-insensitive substring over name and email, applied after ranking.
    pub search: Option<String>,
    /// Maximum number of rows returned.
    pub limit: Option<usize>,
}

fn standing_order(a: &Member, b: &Member) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Ranks members in scope, then applies the search filter and limit.
///
/// Search does not renumber: a filtered row keeps its global rank.
#[must_use]
pub fn rank(members: Vec<MemberWithRole>, query: &SnapshotQuery) -> Vec<LeaderboardEntry> {
    let mut in_scope: Vec<MemberWithRole> = members
        .into_iter()
        .filter(|m| query.scope.includes(m.role))
        .collect();
    in_scope.sort_by(|a, b| standing_order(&a.member, &b.member));

    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let ranked = in_scope
        .into_iter()
        .zip(1u32..)
        .map(|(m, rank)| LeaderboardEntry {
            rank,
            member: m.member,
            role: m.role,
        })
        .filter(|entry| match &needle {
            Some(n) => matches_search(&entry.member, n),
            None => true,
        });

    match query.limit {
        Some(limit) => ranked.take(limit).collect(),
        None => ranked.collect(),
    }
}

fn matches_search(member: &Member, needle: &str) -> bool {
    member.email.to_lowercase().contains(needle)
        || member
            .full_name
            .as_deref()
            .is_some_and(|n| n.to_lowercase().contains(needle))
}
