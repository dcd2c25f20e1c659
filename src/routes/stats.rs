use axum::{extract::State, response::Html, Json};

use crate::db::files;
use crate::error::Result;
use crate::models::{format_bytes, FileStats};
use crate::views::render_stats;
use crate::AppState;

/// Stats page
///
/// GET /stats
pub async fn stats_page(State(state): State<AppState>) -> Result<Html<String>> {
    let stats = files::file_stats(&state.db).await?;
    Ok(Html(render_stats(&stats)))
}

/// Same numbers as the stats page, as JSON
///
/// GET /api/stats
pub async fn stats_json(State(state): State<AppState>) -> Result<Json<FileStats>> {
    let stats = files::file_stats(&state.db).await?;

    tracing::info!(
        "Stats requested: {} files, {}",
        stats.total_files,
        format_bytes(stats.total_size_bytes.max(0) as u64)
    );

    Ok(Json(stats))
}
