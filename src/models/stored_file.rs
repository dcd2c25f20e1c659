use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;
use std::time::SystemTime;

/// A file currently present on disk
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    /// File name, unique within its folder
    pub name: String,
    /// Category label derived from the extension
    pub category: String,
    /// Size in bytes
    pub size: u64,
    /// Last-modified time (RFC 3339, local time)
    pub modified: String,
    /// Absolute location on disk
    #[serde(skip)]
    pub path: PathBuf,
}

impl StoredFile {
    /// Format a filesystem timestamp the way listings expose it
    pub fn format_modified(modified: SystemTime) -> String {
        DateTime::<Local>::from(modified).to_rfc3339()
    }

    /// Size in kilobytes, rounded to two decimals
    pub fn size_kb(&self) -> f64 {
        bytes_to_kb(self.size)
    }
}

/// Convert bytes to kilobytes rounded to two decimals
pub fn bytes_to_kb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 * 100.0).round() / 100.0
}

/// Human-readable size, scaled to the largest unit that keeps it above one
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{} bytes", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", value, UNITS[unit])
}
