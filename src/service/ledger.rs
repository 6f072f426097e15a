//! Points ledger: guarded point changes and their audit trail.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::RoleRegistry;
use super::role_registry::authorize;
use crate::domain::{
    ActivityRecord, ActivityView, Authorized, Member, MemberId, PointChange, Request,
    fold_clamped,
};
use crate::error::ClubError;
use crate::store::ClubStore;

/// Result of refolding a member's history against the stored total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct LedgerReconciliation {
    /// Member checked.
    pub member_id: MemberId,
    /// Total as stored on the member record.
    pub stored_total: i64,
    /// Chronological clamp-at-zero fold of every ledger delta.
    pub replayed_total: i64,
    /// Number of ledger entries replayed.
    pub entries: usize,
    /// `true` when both totals agree.
    pub consistent: bool,
}

/// An accepted point change and the total it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedChange {
    /// The appended ledger entry.
    pub record: ActivityRecord,
    /// Clamped total written in the same commit as `record`.
    pub total_points: i64,
}

/// Applies point changes and serves member history.
#[derive(Debug, Clone)]
pub struct PointsLedger {
    store: Arc<dyn ClubStore>,
    roles: Arc<RoleRegistry>,
}

impl PointsLedger {
    /// Creates a ledger over `store`, consulting `roles` for the guard.
    #[must_use]
    pub fn new(store: Arc<dyn ClubStore>, roles: Arc<RoleRegistry>) -> Self {
        Self { store, roles }
    }

    /// Applies `delta` to `target_id` on behalf of `actor_id`.
    ///
    /// The stored total is floored at zero; the returned record carries the
    /// requested delta and the total is the one committed with it.
    ///
    /// # Errors
    ///
    /// - [`ClubError::Privilege`] if the actor holds the default role,
    ///   whatever the delta
    /// - [`ClubError::Validation`] for a zero delta or blank description
    /// - [`ClubError::NotFound`] if the target does not exist
    pub async fn apply_delta(
        &self,
        actor_id: MemberId,
        target_id: MemberId,
        delta: i64,
        description: &str,
    ) -> Result<AppliedChange, ClubError> {
        let actor = self.roles.actor(actor_id).await?;
        let target = self.roles.target(target_id).await?;
        let grant = authorize(actor, &Request::ChangePoints { target })?;
        let change = PointChange::new(Some(actor_id), target_id, delta, description)?;

        let (member, record) = self.commit(grant, change).await?;
        tracing::info!(
            %actor_id,
            %target_id,
            delta,
            action = record.action_kind.as_str(),
            total = member.total_points,
            "points changed"
        );
        Ok(AppliedChange {
            record,
            total_points: member.total_points,
        })
    }

    async fn commit(
        &self,
        _grant: Authorized,
        change: PointChange,
    ) -> Result<(Member, ActivityRecord), ClubError> {
        self.store.apply_point_change(change).await
    }

    /// Returns the member's ledger, newest first, with actor names resolved.
    ///
    /// Entries outlive their target, so history of a removed member is
    /// still readable. An actor that no longer exists is shown by raw id.
    ///
    /// # Errors
    ///
    /// Only storage failures are reported.
    pub async fn history(&self, target_id: MemberId) -> Result<Vec<ActivityView>, ClubError> {
        let records = self.store.activities_for(target_id).await?;

        let mut actor_ids: Vec<MemberId> = records.iter().filter_map(|r| r.actor_id).collect();
        actor_ids.sort_unstable();
        actor_ids.dedup();
        let names: HashMap<MemberId, String> = self
            .store
            .members(&actor_ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m.display_name().to_string()))
            .collect();

        Ok(records
            .into_iter()
            .map(|record| {
                let actor_name = record
                    .actor_id
                    .map(|id| names.get(&id).cloned().unwrap_or_else(|| id.to_string()));
                ActivityView { record, actor_name }
            })
            .collect())
    }

    /// Returns the stored, clamped total.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::NotFound`] if the member does not exist.
    pub async fn current_total(&self, target_id: MemberId) -> Result<i64, ClubError> {
        self.store
            .member(target_id)
            .await?
            .map(|m| m.total_points)
            .ok_or_else(|| ClubError::member_not_found(target_id))
    }

    /// Replays history chronologically and compares with the stored total.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::NotFound`] if the member does not exist.
    pub async fn verify(&self, target_id: MemberId) -> Result<LedgerReconciliation, ClubError> {
        let stored_total = self.current_total(target_id).await?;
        let records = self.store.activities_for(target_id).await?;
        let replayed_total = fold_clamped(records.iter().rev().map(|r| r.delta));
        let consistent = replayed_total == stored_total;
        if !consistent {
            tracing::warn!(%target_id, stored_total, replayed_total, "ledger mismatch");
        }
        Ok(LedgerReconciliation {
            member_id: target_id,
            stored_total,
            replayed_total,
            entries: records.len(),
            consistent,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{ActionKind, Identity, Role};
    use crate::error::PrivilegeReason;
    use crate::store::MemoryStore;

    struct Fixture {
        store: Arc<dyn ClubStore>,
        roles: Arc<RoleRegistry>,
        ledger: PointsLedger,
        admin: MemberId,
        member: MemberId,
    }

    async fn insert(store: &Arc<dyn ClubStore>, email: &str) -> MemberId {
        let identity = Identity {
            email: email.to_string(),
            full_name: None,
        };
        let Ok(member) = store.insert_member(Member::new(identity)).await else {
            panic!("insert failed");
        };
        member.id
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn ClubStore> = Arc::new(MemoryStore::new());
        let roles = Arc::new(RoleRegistry::new(Arc::clone(&store)));
        let admin = insert(&store, "admin@club.org").await;
        let member = insert(&store, "ada@club.org").await;
        let Ok(()) = roles.seed(admin, Role::Assistant).await else {
            panic!("seed failed");
        };
        let ledger = PointsLedger::new(Arc::clone(&store), Arc::clone(&roles));
        Fixture {
            store,
            roles,
            ledger,
            admin,
            member,
        }
    }

    #[tokio::test]
    async fn floor_clamps_total_but_not_history() {
        let f = fixture().await;
        let Ok(_) = f.ledger.apply_delta(f.admin, f.member, 10, "seed").await else {
            panic!("apply failed");
        };
        let Ok(AppliedChange {
            record,
            total_points,
        }) = f.ledger.apply_delta(f.admin, f.member, -15, "reason").await
        else {
            panic!("apply failed");
        };
        assert_eq!(total_points, 0);
        assert_eq!(record.delta, -15);
        assert_eq!(record.action_kind, ActionKind::PointsRemoved);
        assert_eq!(record.description, "reason");
        assert!(matches!(f.ledger.current_total(f.member).await, Ok(0)));
    }

    #[tokio::test]
    async fn zero_delta_leaves_no_trace() {
        let f = fixture().await;
        let result = f.ledger.apply_delta(f.admin, f.member, 0, "nothing").await;
        assert!(matches!(result, Err(ClubError::Validation(_))));
        let Ok(history) = f.ledger.history(f.member).await else {
            panic!("history failed");
        };
        assert!(history.is_empty());
        assert!(matches!(f.ledger.current_total(f.member).await, Ok(0)));
    }

    #[tokio::test]
    async fn blank_description_is_rejected() {
        let f = fixture().await;
        let result = f.ledger.apply_delta(f.admin, f.member, 5, "   ").await;
        assert!(matches!(result, Err(ClubError::Validation(_))));
    }

    #[tokio::test]
    async fn members_cannot_award_themselves() {
        let f = fixture().await;
        let result = f.ledger.apply_delta(f.member, f.member, 5, "me").await;
        assert!(matches!(
            result,
            Err(ClubError::Privilege(PrivilegeReason::MemberCannotChangePoints))
        ));
        for delta in [-5, 0] {
            let result = f.ledger.apply_delta(f.member, f.admin, delta, "you").await;
            assert!(matches!(result, Err(ClubError::Privilege(_))));
        }
    }

    #[tokio::test]
    async fn missing_target_is_not_found() {
        let f = fixture().await;
        let result = f.ledger.apply_delta(f.admin, MemberId::new(), 5, "x").await;
        assert!(matches!(result, Err(ClubError::NotFound { .. })));
    }

    #[tokio::test]
    async fn concurrent_deltas_both_land() {
        let f = fixture().await;
        let ledger = Arc::new(f.ledger);
        let (admin, member) = (f.admin, f.member);

        let a = tokio::spawn({
            let ledger = Arc::clone(&ledger);
            async move { ledger.apply_delta(admin, member, 5, "first").await }
        });
        let b = tokio::spawn({
            let ledger = Arc::clone(&ledger);
            async move { ledger.apply_delta(admin, member, 3, "second").await }
        });
        let (Ok(Ok(first)), Ok(Ok(second))) = (a.await, b.await) else {
            panic!("apply failed");
        };
        let mut totals = [first.total_points, second.total_points];
        totals.sort_unstable();
        assert!(totals == [3, 8] || totals == [5, 8], "{totals:?}");

        assert!(matches!(ledger.current_total(member).await, Ok(8)));
        let Ok(history) = ledger.history(member).await else {
            panic!("history failed");
        };
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn history_is_newest_first_with_actor_names() {
        let f = fixture().await;
        for (delta, reason) in [(4, "one"), (-2, "two"), (9, "three")] {
            let Ok(_) = f.ledger.apply_delta(f.admin, f.member, delta, reason).await else {
                panic!("apply failed");
            };
        }
        let Ok(history) = f.ledger.history(f.member).await else {
            panic!("history failed");
        };
        let reasons: Vec<&str> = history
            .iter()
            .map(|v| v.record.description.as_str())
            .collect();
        assert_eq!(reasons, ["three", "two", "one"]);
        assert!(
            history
                .iter()
                .all(|v| v.actor_name.as_deref() == Some("admin@club.org"))
        );
    }

    #[tokio::test]
    async fn accepted_change_survives_later_removal_of_target() {
        let f = fixture().await;
        let Ok(applied) = f.ledger.apply_delta(f.admin, f.member, 7, "bonus").await else {
            panic!("apply failed");
        };
        let Ok(()) = f.store.delete_member(f.member, Role::Member).await else {
            panic!("delete failed");
        };
        assert_eq!(applied.total_points, 7);
        assert!(matches!(
            f.ledger.current_total(f.member).await,
            Err(ClubError::NotFound { .. })
        ));
        let Ok(history) = f.ledger.history(f.member).await else {
            panic!("history failed");
        };
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn removed_actor_falls_back_to_raw_id() {
        let f = fixture().await;
        let Ok(_) = f.ledger.apply_delta(f.admin, f.member, 4, "bonus").await else {
            panic!("apply failed");
        };
        let Ok(()) = f.store.delete_member(f.admin, Role::Assistant).await else {
            panic!("delete failed");
        };
        let Ok(history) = f.ledger.history(f.member).await else {
            panic!("history failed");
        };
        let name = history.first().and_then(|v| v.actor_name.clone());
        assert_eq!(name, Some(f.admin.to_string()));
    }

    #[tokio::test]
    async fn verify_matches_clamped_fold() {
        let f = fixture().await;
        for delta in [10, -15, 7, -3, 2] {
            let Ok(_) = f.ledger.apply_delta(f.admin, f.member, delta, "step").await else {
                panic!("apply failed");
            };
        }
        let Ok(report) = f.ledger.verify(f.member).await else {
            panic!("verify failed");
        };
        assert!(report.consistent);
        assert_eq!(report.stored_total, 6);
        assert_eq!(report.entries, 5);
        assert!(matches!(f.roles.get_role(f.member).await, Ok(Role::Member)));
    }
}
