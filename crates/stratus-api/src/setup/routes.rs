//! Route configuration and setup

use crate::constants::{API_PREFIX, MAX_PROXIED_UPLOAD_BYTES};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use stratus_core::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let api = Router::new()
        // Upload flow
        .route(
            "/uploads/session",
            post(handlers::uploads::request_upload_session),
        )
        .route(
            "/uploads/finalize",
            post(handlers::uploads::finalize_upload),
        )
        .route("/files", post(handlers::uploads::upload_file))
        // File lifecycle
        .route(
            "/files/{id}",
            delete(handlers::files::delete_file).patch(handlers::files::rename_file),
        )
        .route("/files/{id}/restore", post(handlers::files::restore_file))
        .route(
            "/files/{id}/permanent",
            delete(handlers::files::delete_file_permanently),
        )
        .route("/files/{id}/download", get(handlers::files::download_file))
        .route("/files/{id}/share", post(handlers::shares::share_file))
        // Public share downloads (the token is the capability)
        .route(
            "/share/{token}/download",
            get(handlers::shares::shared_download),
        )
        // Folders
        .route("/folders", post(handlers::folders::create_folder))
        .route(
            "/folders/contents",
            get(handlers::folders::folder_contents),
        )
        .route("/folders/{id}", delete(handlers::folders::delete_folder))
        .route(
            "/folders/{id}/restore",
            post(handlers::folders::restore_folder),
        )
        .route(
            "/folders/{id}/permanent",
            delete(handlers::folders::delete_folder_permanently),
        )
        // Account
        .route("/me/storage", get(handlers::account::storage_summary))
        .route(
            "/me/notifications",
            get(handlers::account::list_notifications),
        )
        .route(
            "/me/notifications/{id}/read",
            post(handlers::account::mark_notification_read),
        )
        .with_state(state);

    let router = Router::new()
        .nest(API_PREFIX, api)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Proxied uploads carry the whole file in one body
        .layer(DefaultBodyLimit::max(MAX_PROXIED_UPLOAD_BYTES + 1024 * 1024));

    Ok(router)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    if config.cors_origins.is_empty() {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin {}: {}", origin, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::PATCH])
        .allow_headers(Any))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
