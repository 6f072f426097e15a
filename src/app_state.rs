//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::ClubConfig;
use crate::service::{MembershipService, PointsLedger, RankingEngine, ReviewService, RoleRegistry};
use crate::store::ClubStore;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Role reads and guarded role changes.
    pub roles: Arc<RoleRegistry>,
    /// Guarded point changes and history.
    pub ledger: Arc<PointsLedger>,
    /// Leaderboard snapshots.
    pub ranking: Arc<RankingEngine>,
    /// Onboarding, profiles, and removal.
    pub members: Arc<MembershipService>,
    /// Peer reviews.
    pub reviews: Arc<ReviewService>,
    /// Rows shown on the dashboard leaderboard.
    pub dashboard_top_n: usize,
    /// Name of the active storage backend.
    pub storage: &'static str,
}

impl AppState {
    /// Wires every service over one store.
    #[must_use]
    pub fn new(store: Arc<dyn ClubStore>, config: &ClubConfig) -> Self {
        let storage = store.backend();
        let roles = Arc::new(RoleRegistry::new(Arc::clone(&store)));
        let ledger = Arc::new(PointsLedger::new(Arc::clone(&store), Arc::clone(&roles)));
        let ranking = Arc::new(RankingEngine::new(Arc::clone(&store), Arc::clone(&roles)));
        let members = Arc::new(MembershipService::new(
            Arc::clone(&store),
            Arc::clone(&roles),
            config.allowed_email_domain.clone(),
        ));
        let reviews = Arc::new(ReviewService::new(store));
        Self {
            roles,
            ledger,
            ranking,
            members,
            reviews,
            dashboard_top_n: config.dashboard_top_n,
            storage,
        }
    }
}
