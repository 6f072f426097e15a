//! # club-ledger
//!
//! Member reputation service for a club community: an authorization-gated
//! points ledger, a four-tier role hierarchy, and a deterministic
//! leaderboard.
//!
//! Every mutation (points, roles, removal, profile edits) names its actor
//! explicitly and passes the [`domain::AuthorizationGuard`] before any
//! write reaches the store. The ledger is append-only and outlives the
//! members it mentions.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, x-actor-id header)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── RoleRegistry · PointsLedger · RankingEngine
//!     │   MembershipService · ReviewService (service/)
//!     │
//!     ├── AuthorizationGuard · ranking · Role (domain/)
//!     │
//!     └── ClubStore (store/)
//!           ├── MemoryStore (per-member locks)
//!           └── PostgresStore (sqlx transactions)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;
