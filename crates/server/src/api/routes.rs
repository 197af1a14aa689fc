use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::{handlers, sessions};
use crate::state::AppState;

/// Multipart framing on top of the file itself.
const UPLOAD_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Web UI static files path (configurable via env)
    let web_dir = std::env::var("SHARECLIP_WEB_DIR").unwrap_or_else(|_| "web/dist".to_string());
    let body_limit = (state.config().server.max_upload_mb as usize) * 1024 * 1024
        + UPLOAD_OVERHEAD_BYTES;

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/presets", get(handlers::list_presets))
        // Advisory
        .route("/recommend", post(handlers::recommend))
        .route("/estimate", post(handlers::estimate))
        .route("/estimate/cache", delete(handlers::clear_cache))
        .route("/analyze", post(handlers::analyze))
        // Sessions
        .route("/sessions", post(sessions::create_session))
        .route("/sessions/{id}", get(sessions::get_session))
        .route("/sessions/{id}/cancel", post(sessions::cancel_session))
        .route("/sessions/{id}/outputs/{format}", get(sessions::get_output))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    // Serve the web UI with SPA fallback
    let index_path = format!("{}/index.html", web_dir);
    let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(&index_path));

    Router::new()
        .nest("/api/v1", api_routes)
        .fallback_service(serve_dir)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
