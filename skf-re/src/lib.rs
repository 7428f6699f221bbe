//! skf-re - SketchFactor Reputation Engine
//!
//! Organizations, severity-rated reports, per-report votes, and the sketch
//! score derived from each organization's report set. Exposed over HTTP/JSON
//! through thin axum handlers; all operations are plain library functions
//! underneath.

pub mod api;
pub mod auth;
pub mod db;
pub mod error;
pub mod scoring;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::auth_routes())
        .merge(api::twofactor_routes())
        .merge(api::organization_routes())
        .merge(api::report_routes())
        .merge(api::vote_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
