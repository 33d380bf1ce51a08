//! Route table for the HTTP API.

use crate::{handlers, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the application router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/search/suggestions", post(handlers::suggest_handler))
        .route("/search/vector", post(handlers::vector_search_handler))
        .route("/index/chunks", post(handlers::index_chunks_handler))
        .route("/admin/cache/cleanup", post(handlers::cache_cleanup_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
