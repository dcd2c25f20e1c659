//! Filedrop Server Library
//!
//! Upload, list, download and delete files over HTTP. Files live in a
//! storage root on disk, optionally split into category folders; a SQLite
//! table indexes them for stats and delete-by-id.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod reindex;
pub mod routes;
pub mod security;
pub mod storage;
pub mod views;

pub use config::Config;
pub use db::{open_database, Db};
pub use error::{AppError, Result};
pub use storage::Storage;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Arc<Config>,
    pub storage: Storage,
}

impl AppState {
    /// Create a new AppState with the given database, storage and configuration
    pub fn new(db: Db, storage: Storage, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            storage,
        }
    }
}

/// Build the application router with all routes and layers
pub fn create_router(state: AppState) -> Router {
    let body_limit = match state.config.max_upload_bytes {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };

    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::list_files))
        .route("/dashboard", get(routes::dashboard))
        .route("/upload", post(routes::upload_file))
        .route("/download/:name", get(routes::download_file))
        .route("/uploads/:name", get(routes::view_upload))
        .route("/processed/:name", get(routes::view_processed))
        .route("/delete/:id", get(routes::delete_file))
        .route("/stats", get(routes::stats_page))
        .route("/api/stats", get(routes::stats_json))
        .route("/api/files", get(routes::list_records))
        .route("/health", get(routes::health_check))
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
