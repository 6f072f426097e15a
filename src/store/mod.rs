//! Storage layer: the [`ClubStore`] trait and its backends.
//!
//! The store persists members, role assignments, ledger entries, and
//! reviews. It performs no authorization: every mutating call is made by a
//! service after the guard approved it. Each method is one atomic unit;
//! in particular [`ClubStore::apply_point_change`] serialises per member and
//! writes the total and the ledger entry together or not at all.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{
    ActivityRecord, Member, MemberId, MemberWithRole, PointChange, ProfileUpdate, Review, Role,
    RoleAssignment,
};
use crate::error::ClubError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Durable storage for club state.
///
/// Every method fails with [`ClubError::StorageUnavailable`] when the backend
/// is transiently unreachable and [`ClubError::Persistence`] on other backend
/// faults. Writes addressing a missing member fail with
/// [`ClubError::NotFound`].
#[allow(clippy::missing_errors_doc)]
#[async_trait]
pub trait ClubStore: Send + Sync + std::fmt::Debug {
    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;

    // ── Members ─────────────────────────────────────────────────────────

    /// Inserts `member` unless one with the same email exists, in which
    /// case the existing record is returned unchanged.
    async fn insert_member(&self, member: Member) -> Result<Member, ClubError>;

    /// Loads a member by id.
    async fn member(&self, id: MemberId) -> Result<Option<Member>, ClubError>;

    /// Loads a member by normalised email.
    async fn member_by_email(&self, email: &str) -> Result<Option<Member>, ClubError>;

    /// Loads every member in `ids` that still exists.
    async fn members(&self, ids: &[MemberId]) -> Result<Vec<Member>, ClubError>;

    /// Lists all members joined with their effective role.
    async fn list_members(&self) -> Result<Vec<MemberWithRole>, ClubError>;

    /// Applies a profile edit and returns the updated record.
    async fn update_profile(
        &self,
        id: MemberId,
        update: &ProfileUpdate,
    ) -> Result<Member, ClubError>;

    /// Deletes a member, its role assignment, and reviews about it.
    /// Ledger entries are retained.
    ///
    /// The member's effective role is rechecked against `expected_role`
    /// inside the same critical section as the delete; a mismatch fails
    /// with [`ClubError::Conflict`] and deletes nothing.
    async fn delete_member(&self, id: MemberId, expected_role: Role) -> Result<(), ClubError>;

    // ── Roles ───────────────────────────────────────────────────────────

    /// Returns the member's active assignment, if any.
    async fn role_assignment(&self, id: MemberId) -> Result<Option<RoleAssignment>, ClubError>;

    /// Atomically replaces the member's assignment.
    ///
    /// With `expected_role` set, the current effective role is rechecked
    /// under the member's lock and a mismatch fails with
    /// [`ClubError::Conflict`].
    async fn put_role(
        &self,
        assignment: RoleAssignment,
        expected_role: Option<Role>,
    ) -> Result<(), ClubError>;

    // ── Ledger ──────────────────────────────────────────────────────────

    /// Applies a point change: read total, clamp, write total, append entry.
    async fn apply_point_change(
        &self,
        change: PointChange,
    ) -> Result<(Member, ActivityRecord), ClubError>;

    /// Ledger entries for a member, newest first.
    async fn activities_for(&self, target: MemberId) -> Result<Vec<ActivityRecord>, ClubError>;

    // ── Reviews ─────────────────────────────────────────────────────────

    /// Stores a review about an existing member.
    async fn insert_review(&self, review: Review) -> Result<Review, ClubError>;

    /// Reviews about a member, newest first.
    async fn reviews_for(&self, target: MemberId) -> Result<Vec<Review>, ClubError>;
}
