mod file;
mod folder;
pub mod tree;

pub use file::FileEntry;
pub use folder::FolderEntry;

use chrono::{DateTime, Utc};

/// Timestamps read from the host on the last non-cached load.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Timestamps {
    pub created_at: Option<DateTime<Utc>>,
    pub accessed_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl Timestamps {
    /// Platforms that don't record a timestamp leave it `None`.
    pub(crate) fn from_metadata(meta: &std::fs::Metadata) -> Self {
        Self {
            created_at: meta.created().ok().map(DateTime::<Utc>::from),
            accessed_at: meta.accessed().ok().map(DateTime::<Utc>::from),
            modified_at: meta.modified().ok().map(DateTime::<Utc>::from),
        }
    }
}
