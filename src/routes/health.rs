use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

/// Health check endpoint
///
/// Returns the health status of the server, the metadata index and the
/// storage root. Used by load balancers and monitoring systems.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "connected",
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            "disconnected"
        }
    };

    let storage_status = match tokio::fs::metadata(state.storage.root()).await {
        Ok(metadata) if metadata.is_dir() => "available",
        Ok(_) => "unavailable",
        Err(e) => {
            tracing::error!("Storage health check failed: {:?}", e);
            "unavailable"
        }
    };

    let healthy = db_status == "connected" && storage_status == "available";

    Json(json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "database": db_status,
        "storage": storage_status,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
