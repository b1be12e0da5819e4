//! Existence checks on the host filesystem.
//!
//! A probe never fails: any error while reading metadata (missing path,
//! permission denied, broken symlink) reports the path as absent.

use std::path::Path;

use crate::core::EntryType;

/// Returns the type of the resource at `path`, or `None` if nothing is there.
pub fn probe_sync<P: AsRef<Path>>(path: P) -> Option<EntryType> {
    std::fs::metadata(path).ok().map(|meta| kind_of(&meta))
}

/// Async counterpart of [`probe_sync`].
pub async fn probe<P: AsRef<Path>>(path: P) -> Option<EntryType> {
    tokio::fs::metadata(path).await.ok().map(|meta| kind_of(&meta))
}

pub fn is_file_sync<P: AsRef<Path>>(path: P) -> bool {
    probe_sync(path).is_some_and(|kind| kind.is_file())
}

pub fn is_dir_sync<P: AsRef<Path>>(path: P) -> bool {
    probe_sync(path).is_some_and(|kind| kind.is_dir())
}

pub async fn is_file<P: AsRef<Path>>(path: P) -> bool {
    probe(path).await.is_some_and(|kind| kind.is_file())
}

pub async fn is_dir<P: AsRef<Path>>(path: P) -> bool {
    probe(path).await.is_some_and(|kind| kind.is_dir())
}

fn kind_of(meta: &std::fs::Metadata) -> EntryType {
    if meta.is_dir() {
        EntryType::Directory
    } else {
        EntryType::File
    }
}
