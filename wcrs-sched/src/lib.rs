//! wcrs-sched library - Scheduler service
//!
//! Owns show/episode state: the episode lifecycle rules, the conflict
//! checks, and the read-only catalog endpoints the puller consumes.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use wcrs_common::config::StationConfig;
use wcrs_common::storage::ObjectStore;

pub mod api;
pub mod lifecycle;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Schedule database
    pub db: SqlitePool,
    /// Station timezone and lead-time policy
    pub station: StationConfig,
    /// Object storage for the upload handshake; None when unconfigured
    pub store: Option<Arc<dyn ObjectStore>>,
    /// Bucket episodes are uploaded into
    pub bucket_id: Option<String>,
}

impl AppState {
    pub fn new(db: SqlitePool, station: StationConfig) -> Self {
        Self {
            db,
            station,
            store: None,
            bucket_id: None,
        }
    }

    pub fn with_object_store(mut self, store: Arc<dyn ObjectStore>, bucket_id: String) -> Self {
        self.store = Some(store);
        self.bucket_id = Some(bucket_id);
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    api::routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
