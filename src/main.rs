//! club-ledger server entry point.
//!
//! Loads configuration, selects the store, seeds the owner, and serves the
//! REST API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use club_ledger::api;
use club_ledger::app_state::AppState;
use club_ledger::config::ClubConfig;
use club_ledger::store::{ClubStore, MemoryStore, PostgresStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ClubConfig::from_env().context("invalid LISTEN_ADDR")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(addr = %config.listen_addr, "starting club-ledger");

    // Select storage backend
    let store: Arc<dyn ClubStore> = if config.persistence_enabled {
        let store = PostgresStore::connect(&config)
            .await
            .context("connecting to PostgreSQL")?;
        if config.run_migrations {
            store.migrate().await.context("running migrations")?;
            tracing::info!("migrations applied");
        }
        Arc::new(store)
    } else {
        tracing::warn!("persistence disabled, state is kept in memory");
        Arc::new(MemoryStore::new())
    };

    // Build application state
    let app_state = AppState::new(store, &config);

    if let Some(email) = config.owner_email.as_deref() {
        app_state
            .members
            .seed_owner(email)
            .await
            .context("seeding owner")?;
    }

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
