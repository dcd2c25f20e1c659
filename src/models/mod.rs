pub mod category;
pub mod record;
pub mod stored_file;

pub use category::{CategoryRule, Classifier};
pub use record::{CategoryCount, FileStats, MetadataRecord, NewRecord};
pub use stored_file::{bytes_to_kb, format_bytes, StoredFile};
