//! HTTP API for the scheduler service
//!
//! Two surfaces: the unauthenticated catalog reads the puller consumes
//! (`/shows`, `/episodes`), and the JSON CRUD endpoints under `/api` the
//! station web UI calls on behalf of a logged-in DJ.

pub mod handlers;

use crate::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// All routes; state attached by the caller
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        // Catalog reads consumed by wcrs-pull
        .route("/shows", get(handlers::catalog_shows))
        .route("/episodes", get(handlers::catalog_episodes))
        // Show CRUD
        .route("/api/shows", post(handlers::create_show))
        .route("/api/shows/:id", get(handlers::get_show))
        .route("/api/shows/:id", put(handlers::update_show))
        .route("/api/shows/:id", delete(handlers::delete_show))
        .route("/api/shows/:id/next_occurrence", get(handlers::next_occurrence))
        .route("/api/shows/:id/episodes", post(handlers::create_episode))
        // Episode CRUD
        .route("/api/episodes/:id", get(handlers::get_episode))
        .route("/api/episodes/:id", put(handlers::update_episode))
        .route("/api/episodes/:id", delete(handlers::delete_episode))
        // Co-host picker and upload handshake
        .route("/api/djs", get(handlers::list_djs))
        .route("/api/upload_url", get(handlers::upload_url))
}
