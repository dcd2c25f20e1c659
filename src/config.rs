use std::env;
use std::path::PathBuf;

use crate::constants::{DEFAULT_DATABASE_FILE, DEFAULT_FILE_CATEGORIES};
use crate::models::Classifier;

/// Application configuration loaded from environment variables
///
/// Built once at start-up and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Base directory for uploaded files
    pub storage_root: PathBuf,
    /// Read-only folder of processed files shown next to the uploads
    pub processed_dir: PathBuf,
    /// SQLite metadata index
    pub database_path: PathBuf,
    /// Store uploads under `<storage_root>/<category>/` instead of flat
    pub classify_uploads: bool,
    pub classifier: Classifier,
    /// `None` accepts uploads of any size
    pub max_upload_bytes: Option<usize>,
    /// Rebuild the metadata index from disk at start-up
    pub reindex_on_start: bool,
    pub allowed_origins: Vec<String>,
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let storage_root = PathBuf::from(
            env::var("STORAGE_ROOT").unwrap_or_else(|_| "./data/uploads".to_string()),
        );
        let processed_dir = PathBuf::from(
            env::var("PROCESSED_DIR").unwrap_or_else(|_| "./data/processed".to_string()),
        );
        let database_path = env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| storage_root.join(DEFAULT_DATABASE_FILE));

        let classify_uploads = parse_bool("CLASSIFY_UPLOADS", true)?;

        let classifier = Classifier::parse(
            &env::var("FILE_CATEGORIES").unwrap_or_else(|_| DEFAULT_FILE_CATEGORIES.to_string()),
        )?;

        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(value) => Some(value.parse().map_err(|_| "Invalid MAX_UPLOAD_BYTES")?),
            Err(_) => None,
        };

        let reindex_on_start = parse_bool("REINDEX_ON_START", true)?;

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            server_host,
            server_port,
            storage_root,
            processed_dir,
            database_path,
            classify_uploads,
            classifier,
            max_upload_bytes,
            reindex_on_start,
            allowed_origins,
            environment,
        })
    }

    /// Configuration rooted at the given directories with default settings
    pub fn with_dirs(storage_root: impl Into<PathBuf>, processed_dir: impl Into<PathBuf>) -> Self {
        let storage_root = storage_root.into();
        let database_path = storage_root.join(DEFAULT_DATABASE_FILE);

        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            storage_root,
            processed_dir: processed_dir.into(),
            database_path,
            classify_uploads: true,
            classifier: Classifier::parse(DEFAULT_FILE_CATEGORIES)
                .unwrap_or_else(|_| Classifier::new(Vec::new())),
            max_upload_bytes: None,
            reindex_on_start: true,
            allowed_origins: Vec::new(),
            environment: "development".to_string(),
        }
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_bool(var: &str, default: bool) -> Result<bool, String> {
    match env::var(var) {
        Ok(value) => parse_flag(&value).ok_or_else(|| format!("Invalid {}", var)),
        Err(_) => Ok(default),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
