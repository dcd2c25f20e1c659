//! Rebuild the metadata index from the storage root
//!
//! The filesystem is authoritative. Reconciliation drops rows whose file
//! is gone, collapses duplicate rows for one path and indexes files that
//! have no row yet.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::constants::UPLOAD_DATE_FORMAT;
use crate::db::{files, Db};
use crate::error::Result;
use crate::models::NewRecord;
use crate::storage::Storage;

/// What a reconciliation pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReindexReport {
    pub removed: usize,
    pub added: usize,
    pub kept: usize,
}

/// Make the index match the files currently on disk
pub async fn reconcile(db: &Db, storage: &Storage) -> Result<ReindexReport> {
    let on_disk = storage.list_uploads().await?;
    let disk_paths: HashSet<String> = on_disk
        .iter()
        .map(|f| f.path.to_string_lossy().into_owned())
        .collect();

    let mut report = ReindexReport::default();
    let mut indexed: HashMap<String, i64> = HashMap::new();

    for record in files::list_records(db).await? {
        let stale = !disk_paths.contains(&record.path);
        let duplicate = indexed.contains_key(&record.path);

        if stale || duplicate {
            files::delete_record(db, record.id).await?;
            report.removed += 1;
        } else {
            indexed.insert(record.path, record.id);
            report.kept += 1;
        }
    }

    for file in on_disk {
        let path = file.path.to_string_lossy().into_owned();
        if indexed.contains_key(&path) {
            continue;
        }

        let upload_date = match tokio::fs::metadata(&file.path)
            .await
            .and_then(|m| m.modified())
        {
            Ok(modified) => DateTime::<Local>::from(modified),
            Err(_) => Local::now(),
        }
        .format(UPLOAD_DATE_FORMAT)
        .to_string();

        files::upsert_record(
            db,
            &NewRecord {
                name: file.name,
                path,
                size: file.size as i64,
                category: file.category,
                upload_date,
            },
        )
        .await?;
        report.added += 1;
    }

    tracing::info!(
        "Index reconciled: {} kept, {} added, {} removed",
        report.kept,
        report.added,
        report.removed
    );

    Ok(report)
}
