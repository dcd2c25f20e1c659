use std::path::Path;

use crate::constants::MAX_FILE_NAME_BYTES;

// =============================================================================
// File Name Hardening (Path Traversal Protection)
// =============================================================================

/// Check that a client-supplied name is safe to use as a single path segment
///
/// # Rejected
/// - Empty names, `.` and `..`
/// - Names containing `/`, `\`, NUL or any other control character
/// - Names starting with `.` (hidden names are reserved for partial uploads)
/// - Names longer than 255 bytes
///
/// # Returns
/// * `Err(reason)` with a short client-facing explanation
pub fn validate_file_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("name is empty");
    }

    if name == "." || name == ".." {
        return Err("name is a directory reference");
    }

    if name.len() > MAX_FILE_NAME_BYTES {
        return Err("name is too long");
    }

    if name.contains(['/', '\\']) {
        return Err("name contains a path separator");
    }

    if name.chars().any(char::is_control) {
        return Err("name contains control characters");
    }

    if name.starts_with('.') {
        return Err("name starts with '.'");
    }

    Ok(())
}

/// True when `path` is located strictly below `root`
///
/// Both paths are compared component-wise without touching the filesystem,
/// so callers must pass paths built from the same (absolute) root.
pub fn is_within_root(path: &Path, root: &Path) -> bool {
    path != root
        && path.starts_with(root)
        && !path
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
}

/// Build a `Content-Disposition` header value
///
/// ASCII names without quotes or backslashes are emitted as-is. Anything
/// else gets a sanitised fallback plus an RFC 5987 `filename*` parameter.
pub fn content_disposition(disposition: &str, filename: &str) -> String {
    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("{}; filename=\"{}\"", disposition, filename);
    }

    let fallback: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            c => c,
        })
        .collect();

    format!(
        "{}; filename=\"{}\"; filename*=UTF-8''{}",
        disposition,
        fallback,
        urlencoding::encode(filename)
    )
}
