//! Ranking engine: leaderboard snapshots over current totals.

use std::sync::Arc;

use super::RoleRegistry;
use super::role_registry::authorize;
use crate::domain::leaderboard::rank;
use crate::domain::{LeaderboardEntry, LeaderboardScope, MemberId, Request, SnapshotQuery};
use crate::error::ClubError;
use crate::store::ClubStore;

/// Produces leaderboard snapshots. Never mutates state.
#[derive(Debug, Clone)]
pub struct RankingEngine {
    store: Arc<dyn ClubStore>,
    roles: Arc<RoleRegistry>,
}

impl RankingEngine {
    /// Creates an engine reading from `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ClubStore>, roles: Arc<RoleRegistry>) -> Self {
        Self { store, roles }
    }

    /// Snapshot requested by `actor_id`. The full-roster scope is limited
    /// to privileged roles; the members-only board is open to everyone.
    ///
    /// # Errors
    ///
    /// - [`ClubError::Unauthenticated`] if the actor is not a member
    /// - [`ClubError::Privilege`] for [`LeaderboardScope::All`] requested
    ///   by a regular member
    pub async fn snapshot_for(
        &self,
        actor_id: MemberId,
        query: &SnapshotQuery,
    ) -> Result<Vec<LeaderboardEntry>, ClubError> {
        let actor = self.roles.actor(actor_id).await?;
        if query.scope == LeaderboardScope::All {
            let _grant = authorize(actor, &Request::ViewRoster)?;
        }
        self.snapshot(query).await
    }

    /// Ranks members by points, then seniority, then id.
    ///
    /// # Errors
    ///
    /// Only storage failures are reported.
    pub async fn snapshot(
        &self,
        query: &SnapshotQuery,
    ) -> Result<Vec<LeaderboardEntry>, ClubError> {
        let members = self.store.list_members().await?;
        let entries = rank(members, query);
        tracing::debug!(scope = ?query.scope, rows = entries.len(), "leaderboard snapshot");
        Ok(entries)
    }
}
