use sqlx::SqlitePool;

use crate::models::{bytes_to_kb, CategoryCount, FileStats, MetadataRecord, NewRecord};

/// Record a stored file, reusing the existing row for the same path
///
/// Returns the row id. An overwrite keeps the original id and refreshes
/// name, size, category and timestamp; stray duplicate rows for the path
/// are removed.
///
/// Each statement commits on its own and takes the write lock directly, so
/// concurrent callers wait on the busy timeout rather than failing a
/// read-to-write upgrade. Callers serialise writes to one path through the
/// storage path lock.
pub async fn upsert_record(pool: &SqlitePool, record: &NewRecord) -> Result<i64, sqlx::Error> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT MIN(id) FROM files WHERE path = ?")
        .bind(&record.path)
        .fetch_one(pool)
        .await?;

    let Some(id) = existing else {
        return Ok(sqlx::query(
            "INSERT INTO files (name, path, size, type, upload_date) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.name)
        .bind(&record.path)
        .bind(record.size)
        .bind(&record.category)
        .bind(&record.upload_date)
        .execute(pool)
        .await?
        .last_insert_rowid());
    };

    sqlx::query("UPDATE files SET name = ?, size = ?, type = ?, upload_date = ? WHERE id = ?")
        .bind(&record.name)
        .bind(record.size)
        .bind(&record.category)
        .bind(&record.upload_date)
        .bind(id)
        .execute(pool)
        .await?;

    let duplicates = sqlx::query("DELETE FROM files WHERE path = ? AND id <> ?")
        .bind(&record.path)
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    if duplicates > 0 {
        tracing::debug!("Dropped {} duplicate rows for {}", duplicates, record.path);
    }

    Ok(id)
}

/// All rows in insertion order
pub async fn list_records(pool: &SqlitePool) -> Result<Vec<MetadataRecord>, sqlx::Error> {
    sqlx::query_as::<_, MetadataRecord>(
        "SELECT id, name, path, size, type, upload_date FROM files ORDER BY id",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_record(pool: &SqlitePool, id: i64) -> Result<Option<MetadataRecord>, sqlx::Error> {
    sqlx::query_as::<_, MetadataRecord>(
        "SELECT id, name, path, size, type, upload_date FROM files WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Delete a row by id, returning the number of rows removed
pub async fn delete_record(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM files WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Count and total size over the whole index, plus per-category counts
///
/// An empty index yields zero files and zero bytes.
pub async fn file_stats(pool: &SqlitePool) -> Result<FileStats, sqlx::Error> {
    let (total_files, total_size_bytes): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(size), 0) FROM files")
            .fetch_one(pool)
            .await?;

    let categories = sqlx::query_as::<_, CategoryCount>(
        "SELECT type, COUNT(*) AS count FROM files GROUP BY type ORDER BY type",
    )
    .fetch_all(pool)
    .await?;

    Ok(FileStats {
        total_files,
        total_size_bytes,
        total_size_kb: bytes_to_kb(total_size_bytes.max(0) as u64),
        categories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_database;
    use tempfile::TempDir;

    fn new_record(name: &str, category: &str, size: i64) -> NewRecord {
        NewRecord {
            name: name.to_string(),
            path: format!("/srv/uploads/{}/{}", category, name),
            size,
            category: category.to_string(),
            upload_date: "2026-01-01 10:00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_reuses_row() {
        let temp_dir = TempDir::new().unwrap();
        let db = open_database(temp_dir.path().join("test.db")).await.unwrap();

        let first = upsert_record(&db, &new_record("a.pdf", "docs", 10)).await.unwrap();
        let second = upsert_record(&db, &new_record("a.pdf", "docs", 99)).await.unwrap();
        assert_eq!(first, second);

        let records = list_records(&db).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].size, 99);
        assert_eq!(records[0].category, "docs");
    }

    #[tokio::test]
    async fn test_upsert_collapses_duplicate_rows() {
        let temp_dir = TempDir::new().unwrap();
        let db = open_database(temp_dir.path().join("test.db")).await.unwrap();

        let record = new_record("a.pdf", "docs", 1);
        for _ in 0..2 {
            sqlx::query("INSERT INTO files (name, path, size, type, upload_date) VALUES (?, ?, ?, ?, ?)")
                .bind(&record.name)
                .bind(&record.path)
                .bind(record.size)
                .bind(&record.category)
                .bind(&record.upload_date)
                .execute(&db)
                .await
                .unwrap();
        }

        let id = upsert_record(&db, &new_record("a.pdf", "docs", 7)).await.unwrap();

        let records = list_records(&db).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].size, 7);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_upserts_of_distinct_paths() {
        let temp_dir = TempDir::new().unwrap();
        let db = open_database(temp_dir.path().join("test.db")).await.unwrap();

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let db = db.clone();
                tokio::spawn(async move {
                    upsert_record(&db, &new_record(&format!("f{}.txt", i), "docs", i)).await
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(list_records(&db).await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_list_records_in_insertion_order() {
        let temp_dir = TempDir::new().unwrap();
        let db = open_database(temp_dir.path().join("test.db")).await.unwrap();

        for name in ["z.png", "a.txt", "m.zip"] {
            let category = match name {
                "z.png" => "images",
                "a.txt" => "docs",
                _ => "others",
            };
            upsert_record(&db, &new_record(name, category, 1)).await.unwrap();
        }

        let names: Vec<String> = list_records(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["z.png", "a.txt", "m.zip"]);
    }

    #[tokio::test]
    async fn test_delete_record_unknown_id_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let db = open_database(temp_dir.path().join("test.db")).await.unwrap();

        assert_eq!(delete_record(&db, 42).await.unwrap(), 0);

        let id = upsert_record(&db, &new_record("a.pdf", "docs", 1)).await.unwrap();
        assert_eq!(delete_record(&db, id).await.unwrap(), 1);
        assert!(find_record(&db, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_stats_empty_index() {
        let temp_dir = TempDir::new().unwrap();
        let db = open_database(temp_dir.path().join("test.db")).await.unwrap();

        let stats = file_stats(&db).await.unwrap();
        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.total_size_bytes, 0);
        assert_eq!(stats.total_size_kb, 0.0);
        assert!(stats.categories.is_empty());
    }

    #[tokio::test]
    async fn test_file_stats_groups_by_category() {
        let temp_dir = TempDir::new().unwrap();
        let db = open_database(temp_dir.path().join("test.db")).await.unwrap();

        upsert_record(&db, &new_record("a.pdf", "docs", 1024)).await.unwrap();
        upsert_record(&db, &new_record("b.txt", "docs", 512)).await.unwrap();
        upsert_record(&db, &new_record("c.png", "images", 512)).await.unwrap();

        let stats = file_stats(&db).await.unwrap();
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_size_bytes, 2048);
        assert_eq!(stats.total_size_kb, 2.0);
        assert_eq!(stats.count_for("docs"), 2);
        assert_eq!(stats.count_for("images"), 1);
        assert_eq!(stats.count_for("others"), 0);
    }
}
