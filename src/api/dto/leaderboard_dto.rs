//! Leaderboard DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{LeaderboardEntry, LeaderboardScope, SnapshotQuery};

/// Query string for `GET /leaderboard`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardParams {
    /// `members_only` (default) or `all`.
    #[serde(default)]
    pub scope: Option<LeaderboardScope>,
    /// Case-insensitive match on name or email.
    #[serde(default)]
    pub search: Option<String>,
    /// Maximum rows returned.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl From<LeaderboardParams> for SnapshotQuery {
    fn from(params: LeaderboardParams) -> Self {
        Self {
            scope: params.scope.unwrap_or_default(),
            search: params.search,
            limit: params.limit,
        }
    }
}

/// Response body for `GET /leaderboard`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    /// Scope the snapshot was taken over.
    pub scope: LeaderboardScope,
    /// Ranked rows.
    pub data: Vec<LeaderboardEntry>,
}
