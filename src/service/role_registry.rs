//! Role registry: one effective role per member.

use std::sync::Arc;

use crate::domain::{
    AuthorizationGuard, Authorized, MemberId, Party, Precedence, Request, Role, RoleAssignment,
};
use crate::error::ClubError;
use crate::store::ClubStore;

/// Reads and replaces role assignments, and resolves members into guard
/// [`Party`] values.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    store: Arc<dyn ClubStore>,
}

impl RoleRegistry {
    /// Creates a registry over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ClubStore>) -> Self {
        Self { store }
    }

    /// Returns the member's effective role, defaulting to [`Role::Member`]
    /// when unassigned.
    ///
    /// # Errors
    ///
    /// Only storage failures are reported; a missing assignment is not an
    /// error.
    pub async fn get_role(&self, id: MemberId) -> Result<Role, ClubError> {
        Ok(self
            .store
            .role_assignment(id)
            .await?
            .map(|a| a.role)
            .unwrap_or_default())
    }

    /// Total order over roles.
    #[must_use]
    pub fn compare(a: Role, b: Role) -> Precedence {
        Role::compare(a, b)
    }

    /// Resolves the acting member.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Unauthenticated`] if the actor is not a member.
    pub async fn actor(&self, id: MemberId) -> Result<Party, ClubError> {
        if self.store.member(id).await?.is_none() {
            return Err(ClubError::Unauthenticated(format!(
                "actor {id} is not a member"
            )));
        }
        Ok(Party::new(id, self.get_role(id).await?))
    }

    /// Resolves the member a request targets.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::NotFound`] if the target does not exist.
    pub async fn target(&self, id: MemberId) -> Result<Party, ClubError> {
        if self.store.member(id).await?.is_none() {
            return Err(ClubError::member_not_found(id));
        }
        Ok(Party::new(id, self.get_role(id).await?))
    }

    /// Replaces `target_id`'s role on behalf of `actor_id`.
    ///
    /// The actor must hold the highest role, and `new_role` must be below
    /// it. Assigning the role a member already holds leaves exactly one
    /// assignment.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Privilege`] when the guard rejects the change,
    /// [`ClubError::NotFound`] for an unknown target, and
    /// [`ClubError::Conflict`] if the target's role changed after the guard
    /// approved.
    #[tracing::instrument(skip(self))]
    pub async fn set_role(
        &self,
        actor_id: MemberId,
        target_id: MemberId,
        new_role: Role,
    ) -> Result<RoleAssignment, ClubError> {
        let actor = self.actor(actor_id).await?;
        let target = self.target(target_id).await?;
        let request = Request::ChangeRole { target, new_role };
        let grant = authorize(actor, &request)?;

        let assignment = RoleAssignment::new(target_id, new_role, Some(actor_id));
        self.commit(grant, assignment.clone(), target.role).await?;
        tracing::info!(previous = target.role.as_str(), "role assigned");
        Ok(assignment)
    }

    /// Writes `role` for `id` without consulting the guard. Used only for
    /// startup seeding of the owner.
    pub(crate) async fn seed(&self, id: MemberId, role: Role) -> Result<(), ClubError> {
        self.store
            .put_role(RoleAssignment::new(id, role, None), None)
            .await
    }

    async fn commit(
        &self,
        _grant: Authorized,
        assignment: RoleAssignment,
        approved_against: Role,
    ) -> Result<(), ClubError> {
        self.store
            .put_role(assignment, Some(approved_against))
            .await
    }
}

/// Runs the guard and logs rejections.
pub(crate) fn authorize(actor: Party, request: &Request) -> Result<Authorized, ClubError> {
    AuthorizationGuard::authorize(actor, request).inspect_err(|e| {
        tracing::warn!(
            actor = %actor.id,
            actor_role = actor.role.as_str(),
            request = request.kind(),
            error = %e,
            "request rejected"
        );
    })
}
