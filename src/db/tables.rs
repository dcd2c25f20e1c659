/// Files table: one row per stored file, used as a listing/stats cache
pub const CREATE_FILES: &str = r#"
CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    path TEXT,
    size INTEGER,
    type TEXT,
    upload_date TEXT
)
"#;
