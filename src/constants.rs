/// Category assigned to any file whose extension is not in the category table
pub const OTHERS_CATEGORY: &str = "others";

/// Default category table: `label=ext,ext;label=ext`
pub const DEFAULT_FILE_CATEGORIES: &str = "images=jpg,jpeg,png,gif;docs=pdf,txt,doc,docx,csv";

/// Name of the metadata index file, co-located with the storage root by default
pub const DEFAULT_DATABASE_FILE: &str = "file_metadata.db";

/// Multipart field that carries the uploaded file
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Format of `files.upload_date`
pub const UPLOAD_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Longest accepted file name in bytes (common filesystem limit)
pub const MAX_FILE_NAME_BYTES: usize = 255;

/// Suffix of the hidden temporary file an upload streams into
pub const PARTIAL_UPLOAD_SUFFIX: &str = ".part";

// =============================================================================
// Error Messages
// =============================================================================

/// Multipart request without a `file` field
pub const ERR_NO_FILE_PART: &str = "no file part";

/// `file` field with an empty or missing file name
pub const ERR_EMPTY_FILENAME: &str = "empty filename";

/// Requested file does not exist
pub const ERR_FILE_NOT_FOUND: &str = "File not found";
