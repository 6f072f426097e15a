//! REST endpoint handlers organized by resource.

pub mod leaderboard;
pub mod members;
pub mod points;
pub mod reviews;
pub mod roles;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(members::routes())
        .merge(roles::routes())
        .merge(points::routes())
        .merge(reviews::routes())
        .merge(leaderboard::routes())
}
