//! Construction and operation options.

use std::path::PathBuf;

/// Files above this size trigger a diagnostic when read into memory.
pub const LARGE_FILE_THRESHOLD: u64 = 200 * 1024 * 1024;

/// Options for building a [`FileEntry`](crate::FileEntry).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileOptions {
    /// Content to materialize when no file exists yet.
    pub content: Option<Vec<u8>>,
    /// Treat the entry as a fresh copy target, even if a file exists.
    pub is_copy: bool,
    /// Use a random name when nothing exists at the path.
    pub mocked: bool,
    /// Anchor for relative paths instead of the caller's source directory.
    pub base: Option<PathBuf>,
}

impl FileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content<C: Into<Vec<u8>>>(mut self, content: C) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn copy(mut self, is_copy: bool) -> Self {
        self.is_copy = is_copy;
        self
    }

    pub fn mocked(mut self, mocked: bool) -> Self {
        self.mocked = mocked;
        self
    }

    pub fn base<P: Into<PathBuf>>(mut self, base: P) -> Self {
        self.base = Some(base.into());
        self
    }
}

/// Options for building a [`FolderEntry`](crate::FolderEntry).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderOptions {
    pub is_copy: bool,
    pub mocked: bool,
    pub base: Option<PathBuf>,
}

impl FolderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copy(mut self, is_copy: bool) -> Self {
        self.is_copy = is_copy;
        self
    }

    pub fn mocked(mut self, mocked: bool) -> Self {
        self.mocked = mocked;
        self
    }

    pub fn base<P: Into<PathBuf>>(mut self, base: P) -> Self {
        self.base = Some(base.into());
        self
    }
}

/// What a `load` call brings into memory.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Folders only: rebuild `files`/`folders` from the directory listing, recursively.
    pub with_sub: bool,
    /// Read file contents into memory.
    pub with_content: bool,
    /// Issued by another operation; returns early if metadata is already known.
    pub is_internal: bool,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sub(mut self, with_sub: bool) -> Self {
        self.with_sub = with_sub;
        self
    }

    pub fn with_content(mut self, with_content: bool) -> Self {
        self.with_content = with_content;
        self
    }

    pub fn internal(mut self, is_internal: bool) -> Self {
        self.is_internal = is_internal;
        self
    }

    /// Options handed down to the children of a recursive folder load.
    pub(crate) fn for_children(self) -> Self {
        self.internal(true)
    }
}

/// Options for `copy_to` / `move_to`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CopyOptions {
    /// Keep the contents of the new entries in memory.
    pub with_content: bool,
    /// Give the new root entry a random name if nothing exists at the target.
    pub mocked: bool,
}

impl CopyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(mut self, with_content: bool) -> Self {
        self.with_content = with_content;
        self
    }

    pub fn mocked(mut self, mocked: bool) -> Self {
        self.mocked = mocked;
        self
    }
}
