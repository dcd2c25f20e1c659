use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::path::Path as FsPath;
use tokio_util::io::ReaderStream;

use crate::error::Result;
use crate::security::content_disposition;
use crate::storage::Storage;
use crate::AppState;

/// Download an uploaded file as an attachment
///
/// GET /download/:name
pub async fn download_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response> {
    let path = state.storage.upload_path(&name)?;
    serve_file(&state.storage, &path, &name, "attachment").await
}

/// View an uploaded file inline
///
/// GET /uploads/:name
pub async fn view_upload(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response> {
    let path = state.storage.upload_path(&name)?;
    serve_file(&state.storage, &path, &name, "inline").await
}

/// View a processed file inline
///
/// GET /processed/:name
pub async fn view_processed(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response> {
    let path = state.storage.processed_path(&name)?;
    serve_file(&state.storage, &path, &name, "inline").await
}

/// Stream a file from disk with a type guessed from its extension
async fn serve_file(
    storage: &Storage,
    path: &FsPath,
    name: &str,
    disposition: &str,
) -> Result<Response> {
    let (file, size) = storage.open(path).await.inspect_err(|_| {
        tracing::debug!("Requested file not available: {:?}", path);
    })?;

    let content_type = mime_guess::from_path(name)
        .first_or_octet_stream()
        .to_string();

    tracing::debug!("Serving {} ({} bytes, {})", name, size, content_type);

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_LENGTH, size.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(disposition, name)),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}
