pub mod delete;
pub mod download;
pub mod health;
pub mod listing;
pub mod stats;
pub mod upload;

pub use delete::delete_file;
pub use download::{download_file, view_processed, view_upload};
pub use health::health_check;
pub use listing::{dashboard, list_files, list_records};
pub use stats::{stats_json, stats_page};
pub use upload::upload_file;
