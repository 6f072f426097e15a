//! Authorization guard for every state-changing request.
//!
//! [`AuthorizationGuard::authorize`] is a pure predicate over the actor, the
//! target, and the requested effect. It never touches storage. Mutating
//! service paths take the returned [`Authorized`] proof by value, so a write
//! cannot be issued without a prior guard decision.

use super::{MemberId, Role};
use crate::error::{ClubError, PrivilegeReason};

/// A member as seen by the guard: identity plus current effective role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Party {
    /// Member identifier.
    pub id: MemberId,
    /// Effective role at the time of the request.
    pub role: Role,
}

impl Party {
    /// Creates a party.
    #[must_use]
    pub const fn new(id: MemberId, role: Role) -> Self {
        Self { id, role }
    }
}

/// The request kinds the guard evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Apply a point delta to `target`.
    ChangePoints {
        /// Member whose total changes.
        target: Party,
    },
    /// Replace `target`'s role with `new_role`.
    ChangeRole {
        /// Member whose role changes.
        target: Party,
        /// Requested role.
        new_role: Role,
    },
    /// Delete `target`'s membership.
    RemoveMember {
        /// Member to remove.
        target: Party,
    },
    /// Edit `target`'s profile fields.
    EditProfile {
        /// Member whose profile changes.
        target: MemberId,
    },
    /// List every member together with their role.
    ViewRoster,
}

impl Request {
    /// Short name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ChangePoints { .. } => "change_points",
            Self::ChangeRole { .. } => "change_role",
            Self::RemoveMember { .. } => "remove_member",
            Self::EditProfile { .. } => "edit_profile",
            Self::ViewRoster => "view_roster",
        }
    }
}

/// Proof that the guard approved a request.
///
/// Only [`AuthorizationGuard::authorize`] can construct it.
#[derive(Debug)]
#[must_use]
pub struct Authorized {
    _private: (),
}

/// Stateless role-hierarchy guard.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationGuard;

impl AuthorizationGuard {
    /// Decides whether `actor` may perform `request`.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Privilege`] naming the violated rule.
    pub fn authorize(actor: Party, request: &Request) -> Result<Authorized, ClubError> {
        Self::check(actor, request).map_err(ClubError::Privilege)?;
        Ok(Authorized { _private: () })
    }

    fn check(actor: Party, request: &Request) -> Result<(), PrivilegeReason> {
        match *request {
            Request::ChangePoints { .. } => {
                if !actor.role.is_privileged() {
                    return Err(PrivilegeReason::MemberCannotChangePoints);
                }
            }
            Request::ChangeRole { target, new_role } => {
                if actor.id == target.id && new_role > target.role {
                    return Err(PrivilegeReason::SelfPromotion);
                }
                if actor.role != Role::HIGHEST {
                    return Err(PrivilegeReason::RoleChangeRequiresOwner);
                }
                if new_role == Role::HIGHEST {
                    return Err(PrivilegeReason::OwnerRoleNotAssignable);
                }
                if target.role == Role::HIGHEST {
                    return Err(PrivilegeReason::TargetIsOwner);
                }
                if !actor.role.outranks(new_role) || !actor.role.outranks(target.role) {
                    return Err(PrivilegeReason::ActorNotAboveRole);
                }
            }
            Request::RemoveMember { target } => {
                if actor.role < Role::BoardMember {
                    return Err(PrivilegeReason::RemovalRequiresBoard);
                }
                if !actor.role.outranks(target.role) {
                    return Err(PrivilegeReason::TargetNotSubordinate);
                }
            }
            Request::EditProfile { target } => {
                if actor.id != target {
                    return Err(PrivilegeReason::ProfileOwnerOnly);
                }
            }
            Request::ViewRoster => {
                if !actor.role.is_privileged() {
                    return Err(PrivilegeReason::RosterRequiresPrivilege);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(role: Role) -> Party {
        Party::new(MemberId::new(), role)
    }

    fn reason(actor: Party, request: Request) -> Option<PrivilegeReason> {
        match AuthorizationGuard::authorize(actor, &request) {
            Err(ClubError::Privilege(r)) => Some(r),
            _ => None,
        }
    }

    #[test]
    fn members_never_change_points() {
        let actor = party(Role::Member);
        for target in [actor, party(Role::Member), party(Role::Owner)] {
            assert_eq!(
                reason(actor, Request::ChangePoints { target }),
                Some(PrivilegeReason::MemberCannotChangePoints)
            );
        }
    }

    #[test]
    fn privileged_roles_change_anyones_points_including_own() {
        for role in [Role::Owner, Role::BoardMember, Role::Assistant] {
            let actor = party(role);
            assert_eq!(reason(actor, Request::ChangePoints { target: actor }), None);
            let target = party(Role::Owner);
            assert_eq!(reason(actor, Request::ChangePoints { target }), None);
        }
    }

    #[test]
    fn only_owner_changes_roles() {
        let target = party(Role::Member);
        for role in [Role::BoardMember, Role::Assistant, Role::Member] {
            assert_eq!(
                reason(
                    party(role),
                    Request::ChangeRole {
                        target,
                        new_role: Role::Assistant
                    }
                ),
                Some(PrivilegeReason::RoleChangeRequiresOwner)
            );
        }
        let owner = party(Role::Owner);
        let request = Request::ChangeRole {
            target,
            new_role: Role::BoardMember,
        };
        assert_eq!(reason(owner, request), None);
    }

    #[test]
    fn owner_role_is_never_assignable() {
        let owner = party(Role::Owner);
        let request = Request::ChangeRole {
            target: party(Role::BoardMember),
            new_role: Role::Owner,
        };
        assert_eq!(
            reason(owner, request),
            Some(PrivilegeReason::OwnerRoleNotAssignable)
        );
    }

    #[test]
    fn owner_assignment_is_immutable() {
        let owner = party(Role::Owner);
        let request = Request::ChangeRole {
            target: party(Role::Owner),
            new_role: Role::Member,
        };
        assert_eq!(reason(owner, request), Some(PrivilegeReason::TargetIsOwner));
    }

    #[test]
    fn self_promotion_is_rejected_for_everyone() {
        for (role, new_role) in [
            (Role::Member, Role::Assistant),
            (Role::Assistant, Role::BoardMember),
            (Role::BoardMember, Role::Owner),
        ] {
            let actor = party(role);
            let request = Request::ChangeRole {
                target: actor,
                new_role,
            };
            assert_eq!(reason(actor, request), Some(PrivilegeReason::SelfPromotion));
        }
    }

    #[test]
    fn removal_requires_board_and_subordinate_target() {
        let assistant = party(Role::Assistant);
        assert_eq!(
            reason(
                assistant,
                Request::RemoveMember {
                    target: party(Role::Member)
                }
            ),
            Some(PrivilegeReason::RemovalRequiresBoard)
        );

        let board = party(Role::BoardMember);
        assert_eq!(
            reason(
                board,
                Request::RemoveMember {
                    target: party(Role::BoardMember)
                }
            ),
            Some(PrivilegeReason::TargetNotSubordinate)
        );
        assert_eq!(
            reason(board, Request::RemoveMember { target: board }),
            Some(PrivilegeReason::TargetNotSubordinate)
        );
        assert_eq!(
            reason(
                board,
                Request::RemoveMember {
                    target: party(Role::Assistant)
                }
            ),
            None
        );
        assert_eq!(
            reason(
                party(Role::Owner),
                Request::RemoveMember {
                    target: party(Role::BoardMember)
                }
            ),
            None
        );
    }

    #[test]
    fn profiles_are_self_edited() {
        let actor = party(Role::Owner);
        assert_eq!(
            reason(actor, Request::EditProfile { target: actor.id }),
            None
        );
        assert_eq!(
            reason(
                actor,
                Request::EditProfile {
                    target: MemberId::new()
                }
            ),
            Some(PrivilegeReason::ProfileOwnerOnly)
        );
    }

    #[test]
    fn roster_is_privileged() {
        assert_eq!(
            reason(party(Role::Member), Request::ViewRoster),
            Some(PrivilegeReason::RosterRequiresPrivilege)
        );
        assert_eq!(reason(party(Role::Assistant), Request::ViewRoster), None);
    }
}
