//! Service layer: business logic orchestration.
//!
//! Every mutating path resolves the actor and target through
//! [`RoleRegistry`], asks the guard, and only then writes through the
//! store. [`RankingEngine`] and the read paths never mutate.

pub mod ledger;
pub mod membership;
pub mod ranking;
pub mod reviews;
pub mod role_registry;

pub use ledger::{AppliedChange, LedgerReconciliation, PointsLedger};
pub use membership::MembershipService;
pub use ranking::RankingEngine;
pub use reviews::ReviewService;
pub use role_registry::RoleRegistry;
