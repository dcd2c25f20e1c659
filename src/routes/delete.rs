use axum::{
    extract::{Path, State},
    response::Redirect,
};
use std::path::PathBuf;

use crate::db::files;
use crate::error::Result;
use crate::AppState;

/// Delete an indexed file and its row
///
/// GET /delete/:id
///
/// The on-disk file is removed when present, then the row. An unknown id
/// or an already-missing file is not an error; the client is always sent
/// back to the dashboard. The path lock is held across both removals.
pub async fn delete_file(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Redirect> {
    let Some(record) = files::find_record(&state.db, id).await? else {
        tracing::debug!("Delete requested for unknown id {}", id);
        return Ok(Redirect::to("/dashboard"));
    };

    let path = PathBuf::from(&record.path);
    let guard = state.storage.lock(&path).await;

    // Gone if another delete of this id finished while we waited; a file
    // re-uploaded since then belongs to a new row and must stay
    if files::find_record(&state.db, id).await?.is_none() {
        return Ok(Redirect::to("/dashboard"));
    }

    let removed = state.storage.remove(&path).await?;
    files::delete_record(&state.db, id).await?;
    drop(guard);

    tracing::info!(
        "Deleted {} (id {}, file {})",
        record.name,
        id,
        if removed { "removed" } else { "already absent" }
    );

    Ok(Redirect::to("/dashboard"))
}
