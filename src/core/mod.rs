//! Shared, I/O-light building blocks used by both the blocking and the async entry APIs.

pub mod identity;
pub mod mock;
pub mod options;
pub mod parse;
pub mod probe;
pub mod utils;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Kind of resource found at a host path.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

impl EntryType {
    pub fn is_file(&self) -> bool {
        *self == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        *self == EntryType::Directory
    }
}
