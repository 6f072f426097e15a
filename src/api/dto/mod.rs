//! Data Transfer Objects for REST request/response serialization.
//!
//! Domain records that are already wire-shaped (`Member`, `ActivityRecord`,
//! `LeaderboardEntry`) are returned directly; the types here cover request
//! bodies, query strings, and envelopes.

pub mod common_dto;
pub mod leaderboard_dto;
pub mod member_dto;
pub mod points_dto;
pub mod review_dto;
pub mod role_dto;

pub use common_dto::*;
pub use leaderboard_dto::*;
pub use member_dto::*;
pub use points_dto::*;
pub use review_dto::*;
pub use role_dto::*;
