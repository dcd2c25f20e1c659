pub mod files;
pub mod pool;
pub mod tables;

use sqlx::SqlitePool;
use std::path::Path;

pub use pool::create_pool;

/// Database handle type (the pool is cheap to clone across handlers)
pub type Db = SqlitePool;

/// Open or create the metadata index at the given path
///
/// Creates the `files` table if it does not exist yet.
pub async fn open_database(path: impl AsRef<Path>) -> Result<Db, sqlx::Error> {
    let path = path.as_ref();
    tracing::info!("Opening database at: {:?}", path);

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                tracing::error!("Failed to create database directory: {}", e);
                sqlx::Error::Io(e)
            })?;
        }
    }

    let db = create_pool(path).await?;

    sqlx::query(tables::CREATE_FILES).execute(&db).await?;

    tracing::info!("Database initialized successfully");

    Ok(db)
}
