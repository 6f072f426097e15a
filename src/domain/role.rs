//! The club role hierarchy.
//!
//! [`Role`] is the single ordered enumeration every precedence decision goes
//! through. `Ord` follows privilege, so `Role::Owner > Role::BoardMember`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::MemberId;

/// Privilege tier held by a member, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Club owner. Seeded out-of-band, never assignable through the API.
    #[serde(alias = "admin0")]
    Owner,
    /// Board member.
    #[serde(alias = "admin1")]
    BoardMember,
    /// Assistant.
    #[serde(alias = "admin2")]
    Assistant,
    /// Regular member; the implied role when no assignment exists.
    Member,
}

/// Result of comparing two roles by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    /// Left-hand role outranks the right-hand role.
    Higher,
    /// Both roles are the same tier.
    Equal,
    /// Left-hand role is outranked.
    Lower,
}

impl Role {
    /// Every role, highest privilege first.
    pub const ALL: [Role; 4] = [
        Role::Owner,
        Role::BoardMember,
        Role::Assistant,
        Role::Member,
    ];

    /// The highest tier.
    pub const HIGHEST: Role = Role::Owner;

    /// The default tier for members without an assignment.
    pub const LOWEST: Role = Role::Member;

    const fn level(self) -> u8 {
        match self {
            Role::Owner => 3,
            Role::BoardMember => 2,
            Role::Assistant => 1,
            Role::Member => 0,
        }
    }

    /// Compares two roles by privilege.
    #[must_use]
    pub fn compare(a: Role, b: Role) -> Precedence {
        match a.level().cmp(&b.level()) {
            Ordering::Greater => Precedence::Higher,
            Ordering::Equal => Precedence::Equal,
            Ordering::Less => Precedence::Lower,
        }
    }

    /// Returns `true` if `self` strictly outranks `other`.
    #[must_use]
    pub fn outranks(self, other: Role) -> bool {
        Self::compare(self, other) == Precedence::Higher
    }

    /// Returns `true` for the three admin tiers.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        !matches!(self, Role::Member)
    }

    /// Returns the stable storage / wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::BoardMember => "board_member",
            Role::Assistant => "assistant",
            Role::Member => "member",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::LOWEST
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level().cmp(&other.level())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing a [`Role`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" | "admin0" => Ok(Role::Owner),
            "board_member" | "admin1" => Ok(Role::BoardMember),
            "assistant" | "admin2" => Ok(Role::Assistant),
            "member" => Ok(Role::Member),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// The single active role assignment of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RoleAssignment {
    /// Member holding the role.
    pub member_id: MemberId,
    /// Assigned role.
    pub role: Role,
    /// Who made the assignment; `None` for out-of-band seeding.
    pub assigned_by: Option<MemberId>,
    /// When the assignment was made.
    pub assigned_at: DateTime<Utc>,
}

impl RoleAssignment {
    /// Creates an assignment stamped with the current time.
    #[must_use]
    pub fn new(member_id: MemberId, role: Role, assigned_by: Option<MemberId>) -> Self {
        Self {
            member_id,
            role,
            assigned_by,
            assigned_at: Utc::now(),
        }
    }
}

/// Which console a member lands on after sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LandingView {
    /// Owner console: points, roles, and removals.
    OwnerConsole,
    /// Board console: points and removals.
    BoardConsole,
    /// Assistant console: points only.
    AssistantConsole,
    /// Regular member dashboard.
    Dashboard,
}

impl LandingView {
    /// Maps a role to its landing view.
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::Owner => Self::OwnerConsole,
            Role::BoardMember => Self::BoardConsole,
            Role::Assistant => Self::AssistantConsole,
            Role::Member => Self::Dashboard,
        }
    }
}
