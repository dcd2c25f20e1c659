//! Storage root: where uploaded files live on disk
//!
//! Files are written through a hidden `.<name>.part` file in the destination
//! folder and renamed into place, so a listing or download never sees a
//! half-written file.

pub mod locks;

use axum::body::Bytes;
use futures::{Stream, TryStreamExt};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::OwnedMutexGuard;

use crate::config::Config;
use crate::constants::PARTIAL_UPLOAD_SUFFIX;
use crate::error::{AppError, Result};
use crate::models::{Classifier, StoredFile};
use crate::security::{is_within_root, validate_file_name};

pub use locks::PathLocks;

/// Handle to the upload and processed folders
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
    processed_dir: PathBuf,
    database_path: PathBuf,
    classify: bool,
    classifier: Arc<Classifier>,
    locks: PathLocks,
}

impl Storage {
    /// Build a storage handle from configuration
    ///
    /// Relative directories are resolved against the current directory once,
    /// so every path handed out afterwards is absolute.
    pub fn from_config(config: &Config) -> std::io::Result<Self> {
        Ok(Self {
            root: std::path::absolute(&config.storage_root)?,
            processed_dir: std::path::absolute(&config.processed_dir)?,
            database_path: std::path::absolute(&config.database_path)?,
            classify: config.classify_uploads,
            classifier: Arc::new(config.classifier.clone()),
            locks: PathLocks::new(),
        })
    }

    /// Create the storage root and processed folder if missing
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root).await?;
        fs::create_dir_all(&self.processed_dir).await?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    /// Category label for a file name
    pub fn category_of(&self, name: &str) -> &str {
        self.classifier.classify(name)
    }

    /// Folder holding files of the given category
    pub fn folder_for(&self, category: &str) -> PathBuf {
        if self.classify {
            self.root.join(category)
        } else {
            self.root.clone()
        }
    }

    /// Resolve the on-disk location of an uploaded file by name
    ///
    /// The category is re-derived from the name; it is never stored in the
    /// URL. Rejects names that are not a single safe path segment, and names
    /// that would resolve to the metadata index or its companion files.
    pub fn upload_path(&self, name: &str) -> Result<PathBuf> {
        check_name(name)?;
        self.check_reserved(self.folder_for(self.category_of(name)).join(name))
    }

    /// Resolve a file in the processed folder by name
    pub fn processed_path(&self, name: &str) -> Result<PathBuf> {
        check_name(name)?;
        self.check_reserved(self.processed_dir.join(name))
    }

    fn check_reserved(&self, path: PathBuf) -> Result<PathBuf> {
        if is_database_file(&path, &self.database_path) {
            tracing::warn!("Rejected path of the metadata index: {:?}", path);
            return Err(AppError::InvalidFileName("name is reserved".to_string()));
        }
        Ok(path)
    }

    /// Take the per-path writer lock for `path`
    ///
    /// Uploads and deletes hold the guard across both the disk change and
    /// the matching index write, so the two stay consistent per path.
    pub async fn lock(&self, path: &Path) -> OwnedMutexGuard<()> {
        self.locks.lock(path).await
    }

    /// Stream bytes into `dest`, replacing any existing file
    ///
    /// The caller holds the lock from [`Storage::lock`] for `dest`. On any
    /// error the partial file is removed and the previous content (if any)
    /// is left untouched. Returns the size read back from the written file.
    pub async fn write_stream<S, E>(&self, dest: &Path, stream: S) -> Result<u64>
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        AppError: From<E>,
    {
        let parent = dest
            .parent()
            .ok_or_else(|| AppError::InvalidFileName("no parent folder".to_string()))?;
        fs::create_dir_all(parent).await?;

        let partial = partial_path(dest)?;
        if let Err(e) = copy_stream(&partial, stream).await {
            if let Err(cleanup) = fs::remove_file(&partial).await {
                tracing::warn!("Failed to remove partial upload {:?}: {}", partial, cleanup);
            }
            return Err(e);
        }

        fs::rename(&partial, dest).await?;

        Ok(fs::metadata(dest).await?.len())
    }

    /// Remove an uploaded file; the caller holds the lock for `path`
    ///
    /// A missing file is not an error. Paths outside the storage root are
    /// refused and reported as `false`.
    pub async fn remove(&self, path: &Path) -> Result<bool> {
        if !is_within_root(path, &self.root) {
            tracing::warn!("Refusing to delete path outside storage root: {:?}", path);
            return Ok(false);
        }

        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Open a stored file for reading, mapping absence to `FileNotFound`
    pub async fn open(&self, path: &Path) -> Result<(fs::File, u64)> {
        let file = match fs::File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(AppError::FileNotFound),
            Err(e) => return Err(e.into()),
        };

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(AppError::FileNotFound);
        }

        Ok((file, metadata.len()))
    }

    /// Directory scan of every uploaded file, sorted by name then category
    pub async fn list_uploads(&self) -> Result<Vec<StoredFile>> {
        let mut files = Vec::new();

        if self.classify {
            for label in self.classifier.labels() {
                files.extend(self.scan_dir(&self.root.join(label), Some(label)).await?);
            }
        } else {
            files = self.scan_dir(&self.root, None).await?;
        }

        files.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.category.cmp(&b.category)));
        Ok(files)
    }

    /// Directory scan of the processed folder, sorted by name
    pub async fn list_processed(&self) -> Result<Vec<StoredFile>> {
        let mut files = self.scan_dir(&self.processed_dir, None).await?;
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// List regular files in one folder
    ///
    /// Hidden entries (partial uploads), the metadata index itself and
    /// anything that is not a regular file are skipped. A missing folder is
    /// an empty listing.
    async fn scan_dir(&self, dir: &Path, category: Option<&str>) -> Result<Vec<StoredFile>> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                tracing::debug!("Skipping non UTF-8 file name in {:?}", dir);
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            let path = entry.path();
            if is_database_file(&path, &self.database_path) {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                // Removed between read_dir and stat
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            if !metadata.is_file() {
                continue;
            }

            let category = category
                .map(str::to_string)
                .unwrap_or_else(|| self.classifier.classify(&name).to_string());
            let modified = metadata
                .modified()
                .map(StoredFile::format_modified)
                .unwrap_or_default();

            files.push(StoredFile {
                name,
                category,
                size: metadata.len(),
                modified,
                path,
            });
        }

        Ok(files)
    }
}

fn check_name(name: &str) -> Result<()> {
    validate_file_name(name).map_err(|reason| {
        tracing::warn!("Rejected file name {:?}: {}", name, reason);
        AppError::InvalidFileName(reason.to_string())
    })
}

/// `<dir>/.<name>.part` next to the destination
fn partial_path(dest: &Path) -> Result<PathBuf> {
    let name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::InvalidFileName("no file name".to_string()))?;

    Ok(dest.with_file_name(format!(".{}{}", name, PARTIAL_UPLOAD_SUFFIX)))
}

/// The SQLite file and its `-wal`/`-shm`/`-journal` companions
fn is_database_file(path: &Path, database_path: &Path) -> bool {
    if path == database_path {
        return true;
    }

    match (path.to_str(), database_path.to_str()) {
        (Some(path), Some(db)) => path
            .strip_prefix(db)
            .is_some_and(|suffix| matches!(suffix, "-wal" | "-shm" | "-journal")),
        _ => false,
    }
}

async fn copy_stream<S, E>(partial: &Path, stream: S) -> Result<()>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    AppError: From<E>,
{
    let mut stream = std::pin::pin!(stream);
    let mut file = fs::File::create(partial).await?;

    while let Some(chunk) = stream.try_next().await? {
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use tempfile::TempDir;

    fn test_storage(temp_dir: &TempDir, classify: bool) -> Storage {
        let mut config = Config::with_dirs(
            temp_dir.path().join("uploads"),
            temp_dir.path().join("processed"),
        );
        config.classify_uploads = classify;
        Storage::from_config(&config).unwrap()
    }

    fn chunks(parts: &[&str]) -> impl Stream<Item = std::result::Result<Bytes, AppError>> {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::copy_from_slice(p.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_upload_path_uses_category_folder() {
        let temp_dir = TempDir::new().unwrap();
        let storage = test_storage(&temp_dir, true);

        let path = storage.upload_path("photo.PNG").unwrap();
        assert_eq!(path, storage.root().join("images").join("photo.PNG"));

        let flat = test_storage(&temp_dir, false);
        assert_eq!(flat.upload_path("photo.PNG").unwrap(), flat.root().join("photo.PNG"));
    }

    #[tokio::test]
    async fn test_upload_path_rejects_traversal() {
        let temp_dir = TempDir::new().unwrap();
        let storage = test_storage(&temp_dir, true);

        assert!(matches!(
            storage.upload_path("../escape.txt"),
            Err(AppError::InvalidFileName(_))
        ));
        assert!(storage.processed_path("..").is_err());
    }

    #[tokio::test]
    async fn test_database_file_names_are_reserved() {
        let temp_dir = TempDir::new().unwrap();
        let flat = test_storage(&temp_dir, false);

        for name in ["file_metadata.db", "file_metadata.db-wal", "file_metadata.db-shm"] {
            assert!(matches!(flat.upload_path(name), Err(AppError::InvalidFileName(_))));
        }
        assert!(flat.upload_path("file_metadata.db.bak").is_ok());

        // Categorised uploads never land in the root, so the same name is fine there
        let classified = test_storage(&temp_dir, true);
        assert!(classified.upload_path("file_metadata.db").is_ok());
    }

    #[tokio::test]
    async fn test_write_stream_creates_folders_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let storage = test_storage(&temp_dir, true);
        let dest = storage.upload_path("notes.txt").unwrap();

        let size = storage.write_stream(&dest, chunks(&["hello ", "world"])).await.unwrap();
        assert_eq!(size, 11);
        assert_eq!(fs::read(&dest).await.unwrap(), b"hello world");

        storage.write_stream(&dest, chunks(&["v2"])).await.unwrap();
        assert_eq!(fs::read(&dest).await.unwrap(), b"v2");
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_content() {
        let temp_dir = TempDir::new().unwrap();
        let storage = test_storage(&temp_dir, true);
        let dest = storage.upload_path("notes.txt").unwrap();
        storage.write_stream(&dest, chunks(&["original"])).await.unwrap();

        let failing = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(AppError::FileNotFound),
        ]);
        assert!(storage.write_stream(&dest, failing).await.is_err());

        assert_eq!(fs::read(&dest).await.unwrap(), b"original");
        assert!(!partial_path(&dest).unwrap().exists());
    }

    #[tokio::test]
    async fn test_list_uploads_sorted_and_skips_hidden() {
        let temp_dir = TempDir::new().unwrap();
        let storage = test_storage(&temp_dir, true);
        storage.ensure_dirs().await.unwrap();

        for name in ["b.pdf", "a.png", "c.zip"] {
            let dest = storage.upload_path(name).unwrap();
            storage.write_stream(&dest, chunks(&["x"])).await.unwrap();
        }
        fs::write(storage.root().join("docs").join(".tmp.part"), b"x").await.unwrap();
        fs::write(storage.root().join("file_metadata.db"), b"sqlite").await.unwrap();

        let files = storage.list_uploads().await.unwrap();
        let names: Vec<(&str, &str)> = files
            .iter()
            .map(|f| (f.name.as_str(), f.category.as_str()))
            .collect();
        assert_eq!(names, vec![("a.png", "images"), ("b.pdf", "docs"), ("c.zip", "others")]);
    }

    #[tokio::test]
    async fn test_flat_listing_skips_database_files() {
        let temp_dir = TempDir::new().unwrap();
        let storage = test_storage(&temp_dir, false);
        storage.ensure_dirs().await.unwrap();

        fs::write(storage.root().join("file_metadata.db"), b"sqlite").await.unwrap();
        fs::write(storage.root().join("file_metadata.db-wal"), b"wal").await.unwrap();
        fs::write(storage.root().join("report.pdf"), b"pdf").await.unwrap();

        let files = storage.list_uploads().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "report.pdf");
        assert_eq!(files[0].category, "docs");
        assert_eq!(files[0].size, 3);
    }

    #[tokio::test]
    async fn test_remove_tolerates_missing_and_refuses_outside_root() {
        let temp_dir = TempDir::new().unwrap();
        let storage = test_storage(&temp_dir, true);
        let dest = storage.upload_path("a.txt").unwrap();
        storage.write_stream(&dest, chunks(&["x"])).await.unwrap();

        assert!(storage.remove(&dest).await.unwrap());
        assert!(!storage.remove(&dest).await.unwrap());

        let outside = temp_dir.path().join("outside.txt");
        fs::write(&outside, b"keep").await.unwrap();
        assert!(!storage.remove(&outside).await.unwrap());
        assert!(outside.exists());
    }

    #[tokio::test]
    async fn test_open_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let storage = test_storage(&temp_dir, true);

        let path = storage.upload_path("missing.txt").unwrap();
        assert!(matches!(storage.open(&path).await, Err(AppError::FileNotFound)));
    }
}
