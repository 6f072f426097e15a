//! In-memory store with per-member fine-grained locking.
//!
//! Members live in a directory map where each record is individually
//! protected by a [`tokio::sync::Mutex`]. Point changes on different
//! members run concurrently; point changes on the same member are
//! serialised by that member's lock, which is held across the total update
//! and the ledger append.
//!
//! Lock order is always directory → member slot → ledger/roles/reviews.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use super::ClubStore;
use crate::domain::{
    ActivityRecord, Member, MemberId, MemberWithRole, PointChange, ProfileUpdate, Review, Role,
    RoleAssignment,
};
use crate::error::ClubError;

#[derive(Debug)]
struct MemberSlot {
    member: Member,
    /// Set under the slot lock by `delete_member`, so a writer that fetched
    /// the slot before removal observes it and fails with `NotFound`.
    removed: bool,
}

#[derive(Debug, Default)]
struct Directory {
    by_id: HashMap<MemberId, Arc<Mutex<MemberSlot>>>,
    by_email: HashMap<String, MemberId>,
}

/// Process-local [`ClubStore`], used when persistence is disabled and in
/// tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    directory: RwLock<Directory>,
    roles: RwLock<HashMap<MemberId, RoleAssignment>>,
    activities: RwLock<Vec<ActivityRecord>>,
    reviews: RwLock<Vec<Review>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, id: MemberId) -> Result<Arc<Mutex<MemberSlot>>, ClubError> {
        let dir = self.directory.read().await;
        dir.by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| ClubError::member_not_found(id))
    }

    /// Fails with a conflict unless `id` currently holds `expected`. Callers
    /// hold the member's slot lock, which every role write also takes.
    async fn ensure_role(&self, id: MemberId, expected: Role) -> Result<(), ClubError> {
        let current = self
            .roles
            .read()
            .await
            .get(&id)
            .map(|a| a.role)
            .unwrap_or_default();
        if current == expected {
            Ok(())
        } else {
            Err(ClubError::role_changed(id, expected, current))
        }
    }

    /// Returns the number of members.
    pub async fn len(&self) -> usize {
        self.directory.read().await.by_id.len()
    }

    /// Returns `true` if the store holds no members.
    pub async fn is_empty(&self) -> bool {
        self.directory.read().await.by_id.is_empty()
    }
}

#[async_trait]
impl ClubStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert_member(&self, member: Member) -> Result<Member, ClubError> {
        let mut dir = self.directory.write().await;
        if let Some(existing) = dir.by_email.get(&member.email).copied()
            && let Some(slot) = dir.by_id.get(&existing)
        {
            return Ok(slot.lock().await.member.clone());
        }
        dir.by_email.insert(member.email.clone(), member.id);
        dir.by_id.insert(
            member.id,
            Arc::new(Mutex::new(MemberSlot {
                member: member.clone(),
                removed: false,
            })),
        );
        Ok(member)
    }

    async fn member(&self, id: MemberId) -> Result<Option<Member>, ClubError> {
        let Ok(slot) = self.slot(id).await else {
            return Ok(None);
        };
        let slot = slot.lock().await;
        Ok((!slot.removed).then(|| slot.member.clone()))
    }

    async fn member_by_email(&self, email: &str) -> Result<Option<Member>, ClubError> {
        let id = self.directory.read().await.by_email.get(email).copied();
        match id {
            Some(id) => self.member(id).await,
            None => Ok(None),
        }
    }

    async fn members(&self, ids: &[MemberId]) -> Result<Vec<Member>, ClubError> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(member) = self.member(*id).await? {
                found.push(member);
            }
        }
        Ok(found)
    }

    async fn list_members(&self) -> Result<Vec<MemberWithRole>, ClubError> {
        let dir = self.directory.read().await;
        let mut members = Vec::with_capacity(dir.by_id.len());
        for slot in dir.by_id.values() {
            let slot = slot.lock().await;
            if !slot.removed {
                members.push(slot.member.clone());
            }
        }
        drop(dir);

        let roles = self.roles.read().await;
        Ok(members
            .into_iter()
            .map(|member| {
                let role = roles
                    .get(&member.id)
                    .map(|a| a.role)
                    .unwrap_or_default();
                MemberWithRole { member, role }
            })
            .collect())
    }

    async fn update_profile(
        &self,
        id: MemberId,
        update: &ProfileUpdate,
    ) -> Result<Member, ClubError> {
        let slot = self.slot(id).await?;
        let mut slot = slot.lock().await;
        if slot.removed {
            return Err(ClubError::member_not_found(id));
        }
        update.apply(&mut slot.member);
        Ok(slot.member.clone())
    }

    async fn delete_member(&self, id: MemberId, expected_role: Role) -> Result<(), ClubError> {
        let mut dir = self.directory.write().await;
        let slot = dir
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| ClubError::member_not_found(id))?;
        let mut slot = slot.lock().await;
        self.ensure_role(id, expected_role).await?;
        dir.by_id.remove(&id);
        dir.by_email.remove(&slot.member.email);
        slot.removed = true;

        self.roles.write().await.remove(&id);
        self.reviews.write().await.retain(|r| r.target_id != id);
        Ok(())
    }

    async fn role_assignment(&self, id: MemberId) -> Result<Option<RoleAssignment>, ClubError> {
        Ok(self.roles.read().await.get(&id).cloned())
    }

    async fn put_role(
        &self,
        assignment: RoleAssignment,
        expected_role: Option<Role>,
    ) -> Result<(), ClubError> {
        let slot = self.slot(assignment.member_id).await?;
        let slot = slot.lock().await;
        if slot.removed {
            return Err(ClubError::member_not_found(assignment.member_id));
        }
        if let Some(expected) = expected_role {
            self.ensure_role(assignment.member_id, expected).await?;
        }
        // Single map insert under the write lock: readers see either the
        // old assignment or the new one.
        self.roles
            .write()
            .await
            .insert(assignment.member_id, assignment);
        Ok(())
    }

    async fn apply_point_change(
        &self,
        change: PointChange,
    ) -> Result<(Member, ActivityRecord), ClubError> {
        let slot = self.slot(change.target_id).await?;
        let mut slot = slot.lock().await;
        if slot.removed {
            return Err(ClubError::member_not_found(change.target_id));
        }

        let new_total = change.apply_to(slot.member.total_points);
        let record = change.into_record();
        self.activities.write().await.push(record.clone());
        slot.member.total_points = new_total;

        Ok((slot.member.clone(), record))
    }

    async fn activities_for(&self, target: MemberId) -> Result<Vec<ActivityRecord>, ClubError> {
        let log = self.activities.read().await;
        // Appends happen in acceptance order, so reversing yields newest first.
        Ok(log
            .iter()
            .rev()
            .filter(|a| a.target_id == target)
            .cloned()
            .collect())
    }

    async fn insert_review(&self, review: Review) -> Result<Review, ClubError> {
        let slot = self.slot(review.target_id).await?;
        let slot = slot.lock().await;
        if slot.removed {
            return Err(ClubError::member_not_found(review.target_id));
        }
        self.reviews.write().await.push(review.clone());
        Ok(review)
    }

    async fn reviews_for(&self, target: MemberId) -> Result<Vec<Review>, ClubError> {
        let reviews = self.reviews.read().await;
        Ok(reviews
            .iter()
            .rev()
            .filter(|r| r.target_id == target)
            .cloned()
            .collect())
    }
}
