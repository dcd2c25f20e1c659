use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::Local;
use serde::Serialize;

use crate::constants::{UPLOAD_DATE_FORMAT, UPLOAD_FIELD_NAME};
use crate::db::files;
use crate::error::{AppError, Result};
use crate::models::NewRecord;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub id: i64,
    pub path: String,
    pub category: String,
    pub size: u64,
}

/// Store an uploaded file and record it in the metadata index
///
/// # Behaviour
/// 1. The first multipart field named `file` is used; other fields are ignored
/// 2. Missing part, empty name or unsafe name is a 400 and nothing is written
/// 3. The file is streamed into `<root>[/<category>]/<name>`, replacing any
///    previous file of the same name
/// 4. The index row for that path is inserted or refreshed
///
/// Browsers (`Accept: text/html`) are redirected back to the dashboard;
/// other clients get JSON.
pub async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }

        let name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(AppError::EmptyFileName),
        };

        let dest = state.storage.upload_path(&name)?;
        let category = state.storage.category_of(&name).to_string();

        // Held until the row is written so a concurrent upload or delete of
        // the same path cannot interleave between file and index.
        let guard = state.storage.lock(&dest).await;
        let size = state.storage.write_stream(&dest, field).await?;

        // File and index row are not updated atomically; a failure here
        // leaves the file on disk until the next reconciliation.
        let path = dest.to_string_lossy().into_owned();
        let id = files::upsert_record(
            &state.db,
            &NewRecord {
                name: name.clone(),
                path: path.clone(),
                size: size as i64,
                category: category.clone(),
                upload_date: Local::now().format(UPLOAD_DATE_FORMAT).to_string(),
            },
        )
        .await?;
        drop(guard);

        tracing::info!("Stored {} ({} bytes) as {} in {}", name, size, id, category);

        if wants_html(&headers) {
            return Ok(Redirect::to("/dashboard").into_response());
        }

        return Ok(Json(UploadResponse {
            ok: true,
            id,
            path,
            category,
            size,
        })
        .into_response());
    }

    Err(AppError::MissingFilePart)
}

fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}
