//! Domain layer: identifiers, the role hierarchy, member and ledger
//! records, the authorization guard, and leaderboard ranking.
//!
//! Everything here is storage-agnostic. The guard and the ranking function
//! are pure; the store and service layers build on top of them.

pub mod activity;
pub mod guard;
pub mod ids;
pub mod leaderboard;
pub mod member;
pub mod review;
pub mod role;

pub use activity::{ActionKind, ActivityRecord, ActivityView, PointChange, fold_clamped};
pub use guard::{AuthorizationGuard, Authorized, Party, Request};
pub use ids::{ActivityId, MemberId, ReviewId};
pub use leaderboard::{LeaderboardEntry, LeaderboardScope, SnapshotQuery};
pub use member::{Identity, Member, MemberWithRole, ProfileUpdate};
pub use review::{Review, ReviewSummary, ReviewView};
pub use role::{LandingView, Precedence, Role, RoleAssignment};
