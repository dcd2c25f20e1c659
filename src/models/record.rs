use serde::Serialize;

/// One row of the `files` metadata index
///
/// Intended 1:1 with a file on disk by `path`, but the index is only a cache:
/// a row can outlive its file until the next reconciliation.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MetadataRecord {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub size: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "category")]
    pub category: String,
    pub upload_date: String,
}

/// Values written to the index after a file lands on disk
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub name: String,
    pub path: String,
    pub size: i64,
    pub category: String,
    pub upload_date: String,
}

/// Aggregate numbers over the whole index
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileStats {
    pub total_files: i64,
    pub total_size_bytes: i64,
    /// Total size in KB, rounded to two decimals
    pub total_size_kb: f64,
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CategoryCount {
    #[sqlx(rename = "type")]
    pub category: String,
    pub count: i64,
}

impl FileStats {
    /// Number of indexed files in a category, zero when absent
    pub fn count_for(&self, category: &str) -> i64 {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}
