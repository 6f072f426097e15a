//! Membership lifecycle: onboarding, profile edits, and removal.

use std::sync::Arc;

use super::RoleRegistry;
use super::role_registry::authorize;
use crate::domain::{
    Authorized, Identity, LandingView, Member, MemberId, MemberWithRole, Party, ProfileUpdate,
    Request, Role,
};
use crate::error::ClubError;
use crate::store::ClubStore;

/// Creates, edits, lists, and removes members.
#[derive(Debug, Clone)]
pub struct MembershipService {
    store: Arc<dyn ClubStore>,
    roles: Arc<RoleRegistry>,
    allowed_domain: Option<String>,
}

impl MembershipService {
    /// Creates the service. When `allowed_domain` is set, only emails under
    /// it may join.
    #[must_use]
    pub fn new(
        store: Arc<dyn ClubStore>,
        roles: Arc<RoleRegistry>,
        allowed_domain: Option<String>,
    ) -> Self {
        Self {
            store,
            roles,
            allowed_domain,
        }
    }

    /// Onboards an authenticated identity.
    ///
    /// Idempotent on email: a second call returns the existing record
    /// unchanged. New members start at zero points with the default role.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Validation`] for a malformed email or one
    /// outside the allowed domain.
    pub async fn create(&self, email: &str, full_name: Option<&str>) -> Result<Member, ClubError> {
        let identity = Identity::parse(email, full_name, self.allowed_domain.as_deref())?;
        if let Some(existing) = self.store.member_by_email(&identity.email).await? {
            return Ok(existing);
        }
        let member = self.store.insert_member(Member::new(identity)).await?;
        tracing::info!(member_id = %member.id, email = %member.email, "member onboarded");
        Ok(member)
    }

    /// Creates `email` if needed and grants it the owner role without going
    /// through the guard. Startup only.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Validation`] for a malformed email.
    pub async fn seed_owner(&self, email: &str) -> Result<Member, ClubError> {
        let identity = Identity::parse(email, None, None)?;
        let member = self.store.insert_member(Member::new(identity)).await?;
        self.roles.seed(member.id, Role::HIGHEST).await?;
        tracing::info!(member_id = %member.id, email = %member.email, "owner seeded");
        Ok(member)
    }

    /// Loads a member with its effective role.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::NotFound`] if the member does not exist.
    pub async fn detail(&self, id: MemberId) -> Result<MemberWithRole, ClubError> {
        let member = self
            .store
            .member(id)
            .await?
            .ok_or_else(|| ClubError::member_not_found(id))?;
        let role = self.roles.get_role(id).await?;
        Ok(MemberWithRole { member, role })
    }

    /// Resolves where the actor lands after sign-in.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Unauthenticated`] if the actor is not a member.
    pub async fn landing(
        &self,
        actor_id: MemberId,
    ) -> Result<(MemberWithRole, LandingView), ClubError> {
        let profile = self.detail(actor_id).await.map_err(|e| match e {
            ClubError::NotFound { .. } => {
                ClubError::Unauthenticated(format!("actor {actor_id} is not a member"))
            }
            other => other,
        })?;
        let view = LandingView::for_role(profile.role);
        Ok((profile, view))
    }

    /// Lists every member with their role, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Privilege`] unless the actor holds a privileged
    /// role.
    pub async fn roster(&self, actor_id: MemberId) -> Result<Vec<MemberWithRole>, ClubError> {
        let actor = self.roles.actor(actor_id).await?;
        let _grant = authorize(actor, &Request::ViewRoster)?;
        let mut members = self.store.list_members().await?;
        members.sort_by(|a, b| {
            a.member
                .created_at
                .cmp(&b.member.created_at)
                .then_with(|| a.member.id.cmp(&b.member.id))
        });
        Ok(members)
    }

    /// Edits the actor's own profile.
    ///
    /// # Errors
    ///
    /// - [`ClubError::Privilege`] if `target_id` is not the actor
    /// - [`ClubError::Validation`] if the update changes nothing
    pub async fn update_profile(
        &self,
        actor_id: MemberId,
        target_id: MemberId,
        update: ProfileUpdate,
    ) -> Result<Member, ClubError> {
        let actor = self.roles.actor(actor_id).await?;
        let _grant = authorize(actor, &Request::EditProfile { target: target_id })?;
        if update.is_empty() {
            return Err(ClubError::validation("profile update has no fields"));
        }
        let member = self.store.update_profile(target_id, &update).await?;
        tracing::info!(member_id = %member.id, "profile updated");
        Ok(member)
    }

    /// Removes `target_id` on behalf of `actor_id`.
    ///
    /// The member record and its role assignment are deleted together;
    /// ledger entries about the member are retained.
    ///
    /// # Errors
    ///
    /// - [`ClubError::Privilege`] unless the actor is board tier or above
    ///   and strictly outranks the target
    /// - [`ClubError::NotFound`] if the target does not exist
    /// - [`ClubError::Conflict`] if the target's role changed after the
    ///   guard approved
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, actor_id: MemberId, target_id: MemberId) -> Result<(), ClubError> {
        let actor = self.roles.actor(actor_id).await?;
        let target = self.roles.target(target_id).await?;
        let grant = authorize(actor, &Request::RemoveMember { target })?;
        self.commit_removal(grant, target).await?;
        tracing::info!(role = target.role.as_str(), "member removed");
        Ok(())
    }

    async fn commit_removal(&self, _grant: Authorized, target: Party) -> Result<(), ClubError> {
        self.store.delete_member(target.id, target.role).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::error::PrivilegeReason;
    use crate::service::PointsLedger;
    use crate::store::MemoryStore;

    struct Fixture {
        roles: Arc<RoleRegistry>,
        ledger: PointsLedger,
        members: MembershipService,
        owner: MemberId,
    }

    fn fixture_with_domain(
        domain: Option<&str>,
    ) -> (Arc<dyn ClubStore>, Arc<RoleRegistry>, MembershipService) {
        let store: Arc<dyn ClubStore> = Arc::new(MemoryStore::new());
        let roles = Arc::new(RoleRegistry::new(Arc::clone(&store)));
        let members = MembershipService::new(
            Arc::clone(&store),
            Arc::clone(&roles),
            domain.map(str::to_string),
        );
        (store, roles, members)
    }

    async fn fixture() -> Fixture {
        let (store, roles, members) = fixture_with_domain(None);
        let Ok(owner) = members.seed_owner("owner@club.org").await else {
            panic!("seed failed");
        };
        let ledger = PointsLedger::new(store, Arc::clone(&roles));
        Fixture {
            roles,
            ledger,
            members,
            owner: owner.id,
        }
    }

    async fn join(members: &MembershipService, email: &str) -> MemberId {
        let Ok(member) = members.create(email, None).await else {
            panic!("create failed");
        };
        member.id
    }

    #[tokio::test]
    async fn create_is_idempotent_and_defaults() {
        let f = fixture().await;
        let Ok(first) = f.members.create("Ada@Club.org", Some("Ada")).await else {
            panic!("create failed");
        };
        let Ok(second) = f.members.create("ada@club.org", Some("Other")).await else {
            panic!("create failed");
        };
        assert_eq!(first.id, second.id);
        assert_eq!(second.full_name.as_deref(), Some("Ada"));
        assert_eq!(first.total_points, 0);
        assert!(matches!(f.roles.get_role(first.id).await, Ok(Role::Member)));
    }

    #[tokio::test]
    async fn create_enforces_domain() {
        let (_, _, members) = fixture_with_domain(Some("edu.umi.ac.ma"));
        assert!(matches!(
            members.create("ada@gmail.com", None).await,
            Err(ClubError::Validation(_))
        ));
        assert!(members.create("ada@edu.umi.ac.ma", None).await.is_ok());
    }

    #[tokio::test]
    async fn seeded_owner_lands_on_owner_console() {
        let f = fixture().await;
        let Ok((profile, view)) = f.members.landing(f.owner).await else {
            panic!("landing failed");
        };
        assert_eq!(profile.role, Role::Owner);
        assert_eq!(view, LandingView::OwnerConsole);
        assert!(matches!(
            f.members.landing(MemberId::new()).await,
            Err(ClubError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn assistant_cannot_remove_board_member() {
        let f = fixture().await;
        let board = join(&f.members, "board@club.org").await;
        let assistant = join(&f.members, "asst@club.org").await;
        for (id, role) in [(board, Role::BoardMember), (assistant, Role::Assistant)] {
            let Ok(_) = f.roles.set_role(f.owner, id, role).await else {
                panic!("set_role failed");
            };
        }
        assert!(matches!(f.roles.get_role(board).await, Ok(Role::BoardMember)));

        let result = f.members.remove(assistant, board).await;
        assert!(matches!(
            result,
            Err(ClubError::Privilege(PrivilegeReason::RemovalRequiresBoard))
        ));
        assert!(f.members.detail(board).await.is_ok());
    }

    #[tokio::test]
    async fn board_cannot_remove_peer_or_self() {
        let f = fixture().await;
        let a = join(&f.members, "a@club.org").await;
        let b = join(&f.members, "b@club.org").await;
        for id in [a, b] {
            let Ok(_) = f.roles.set_role(f.owner, id, Role::BoardMember).await else {
                panic!("set_role failed");
            };
        }
        for target in [b, a, f.owner] {
            assert!(matches!(
                f.members.remove(a, target).await,
                Err(ClubError::Privilege(PrivilegeReason::TargetNotSubordinate))
            ));
        }
    }

    #[tokio::test]
    async fn promotion_after_approval_blocks_removal() {
        let f = fixture().await;
        let board = join(&f.members, "board@club.org").await;
        let ada = join(&f.members, "ada@club.org").await;
        let Ok(_) = f.roles.set_role(f.owner, board, Role::BoardMember).await else {
            panic!("set_role failed");
        };
        let Ok(actor) = f.roles.actor(board).await else {
            panic!("actor missing");
        };
        let Ok(target) = f.roles.target(ada).await else {
            panic!("target missing");
        };
        let Ok(grant) = authorize(actor, &Request::RemoveMember { target }) else {
            panic!("removal approved for a regular member");
        };

        let Ok(_) = f.roles.set_role(f.owner, ada, Role::BoardMember).await else {
            panic!("set_role failed");
        };
        let result = f.members.commit_removal(grant, target).await;
        assert!(matches!(result, Err(ClubError::Conflict(_))));
        assert!(f.members.detail(ada).await.is_ok());
    }

    #[tokio::test]
    async fn removal_keeps_history() {
        let f = fixture().await;
        let ada = join(&f.members, "ada@club.org").await;
        let Ok(_) = f.ledger.apply_delta(f.owner, ada, 12, "welcome").await else {
            panic!("apply failed");
        };
        let Ok(()) = f.members.remove(f.owner, ada).await else {
            panic!("remove failed");
        };
        assert!(matches!(
            f.members.detail(ada).await,
            Err(ClubError::NotFound { .. })
        ));
        assert!(matches!(f.roles.get_role(ada).await, Ok(Role::Member)));
        let Ok(history) = f.ledger.history(ada).await else {
            panic!("history failed");
        };
        assert_eq!(history.len(), 1);
        assert!(matches!(
            f.members.remove(f.owner, ada).await,
            Err(ClubError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn profile_is_self_service() {
        let f = fixture().await;
        let ada = join(&f.members, "ada@club.org").await;
        let update = ProfileUpdate::from_fields(Some("Ada L."), Some("https://cdn/ada.png"));

        let denied = f.members.update_profile(f.owner, ada, update.clone()).await;
        assert!(matches!(
            denied,
            Err(ClubError::Privilege(PrivilegeReason::ProfileOwnerOnly))
        ));

        let Ok(member) = f.members.update_profile(ada, ada, update).await else {
            panic!("update failed");
        };
        assert_eq!(member.display_name(), "Ada L.");
        assert_eq!(member.avatar_url.as_deref(), Some("https://cdn/ada.png"));

        let empty = f.members.update_profile(ada, ada, ProfileUpdate::default()).await;
        assert!(matches!(empty, Err(ClubError::Validation(_))));
    }

    #[tokio::test]
    async fn roster_requires_privilege() {
        let f = fixture().await;
        let ada = join(&f.members, "ada@club.org").await;
        assert!(matches!(
            f.members.roster(ada).await,
            Err(ClubError::Privilege(PrivilegeReason::RosterRequiresPrivilege))
        ));
        let Ok(roster) = f.members.roster(f.owner).await else {
            panic!("roster failed");
        };
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.first().map(|m| m.member.id), Some(f.owner));
    }
}
