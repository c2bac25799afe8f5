pub mod export;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::optimization::handlers;
use crate::state::AppState;

/// Transport-level cap. Larger than the 10 MiB upload rule so oversized
/// files reach validation and get a proper 400.
const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Optimization API
        .route("/api/optimize/upload", post(handlers::handle_upload))
        .route("/api/optimize/status/:id", get(handlers::handle_status))
        .route("/api/optimize/results/:id", get(handlers::handle_results))
        .route("/api/optimize/download/:id", get(handlers::handle_download))
        .route("/api/optimize/session/:id", delete(handlers::handle_delete))
        .route("/api/optimize/sessions", get(handlers::handle_list))
        // Editor export
        .route("/api/export/pdf", post(export::handle_export_pdf))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
