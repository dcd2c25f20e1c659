use axum::{extract::State, response::Html, Json};
use serde::Serialize;
use std::collections::HashMap;

use crate::db::files;
use crate::error::Result;
use crate::models::{MetadataRecord, StoredFile};
use crate::views::render_dashboard;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ListFilesResponse {
    pub files: Vec<StoredFile>,
}

/// List stored files straight from disk
///
/// GET /
///
/// Always reflects the current state of the storage root, sorted by name.
pub async fn list_files(State(state): State<AppState>) -> Result<Json<ListFilesResponse>> {
    let files = state.storage.list_uploads().await?;
    Ok(Json(ListFilesResponse { files }))
}

/// List rows of the metadata index in insertion order
///
/// GET /api/files
///
/// Rows are not checked against the disk and may be stale until the next
/// reconciliation.
pub async fn list_records(State(state): State<AppState>) -> Result<Json<Vec<MetadataRecord>>> {
    Ok(Json(files::list_records(&state.db).await?))
}

/// HTML dashboard with upload form, uploaded files and processed files
///
/// GET /dashboard
pub async fn dashboard(State(state): State<AppState>) -> Result<Html<String>> {
    let uploads = state.storage.list_uploads().await?;
    let processed = state.storage.list_processed().await?;

    let ids: HashMap<String, i64> = files::list_records(&state.db)
        .await?
        .into_iter()
        .map(|record| (record.path, record.id))
        .collect();

    Ok(Html(render_dashboard(&uploads, &ids, &processed)))
}
