//! Router configuration for the web server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root and /documents are the same listing
        .route("/", get(handlers::list_documents))
        .route("/documents", get(handlers::list_documents))
        .route(
            "/upload",
            get(handlers::upload_form).post(handlers::upload_document),
        )
        .route("/documents/:doc_id", get(handlers::document_detail))
        .route("/documents/:doc_id/delete", post(handlers::delete_document))
        .route("/report", get(handlers::report))
        // JSON API
        .route(
            "/api/documents",
            get(handlers::api_list_documents).post(handlers::api_upload_document),
        )
        .route(
            "/api/documents/:doc_id",
            get(handlers::api_get_document).delete(handlers::api_delete_document),
        )
        .route("/api/report", get(handlers::api_report))
        // Stored uploads and static assets
        .route("/files/*path", get(handlers::serve_file))
        .route("/static/style.css", get(handlers::serve_css))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
