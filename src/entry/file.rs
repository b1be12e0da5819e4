//! A single file, real or mocked, loaded lazily.
//!
//! Every operation comes in two flavours with the same contract: a blocking
//! one (`*_sync`) and an async one running on tokio. Decisions (when to
//! materialize, when a load may be skipped, what a removal resets) live in
//! private helpers shared by both; the flavours only differ in how they call
//! the filesystem.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

use crate::core::identity::{Identities, PathIdentity, resolve_identity};
use crate::core::options::{CopyOptions, FileOptions, LARGE_FILE_THRESHOLD, LoadOptions};
use crate::core::parse::{ParsedPath, PathBase, parse_path};
use crate::core::{EntryType, Result, probe, utils};
use crate::entry::Timestamps;
use crate::error::EntryError;

/// A file on the host, or one that will exist once it is loaded.
///
/// Construction resolves identity and existence synchronously and never
/// touches the disk otherwise. Metadata (`size`, timestamps) and content are
/// only populated by `load` / `load_sync` or by operations that load internally.
///
/// ### Lifecycle
///
/// - **Existing file**: `file_exists()` is true right away.
/// - **Supplied content**: the first load writes it to disk, creating parent
///   folders as needed.
/// - **Neither**: construction fails with [`EntryError::NotFoundFile`].
/// - **Removed**: all metadata is cleared; a second removal fails with
///   [`EntryError::NotFoundFile`].
///
/// ### Example
/// ```no_run
/// use entry_kit::{FileEntry, FileOptions, LoadOptions};
///
/// let mut file = FileEntry::new("/tmp/notes/today.txt", FileOptions::new().content("hello"))?;
/// file.load_sync(LoadOptions::new())?;
/// assert_eq!(file.size(), Some(5));
///
/// file.append_sync(b", world")?;
/// assert_eq!(file.get_content_sync(false)?, b"hello, world");
/// file.remove_sync()?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileEntry {
    ids: Identities,
    mime: Option<String>,
    extension: String,
    is_copy: bool,
    original_file_exists: bool,
    file_exists: bool,
    content: Option<Vec<u8>>,
    times: Timestamps,
    size: Option<u64>,
}

impl FileEntry {
    /// Builds an entry for `path`.
    ///
    /// A relative `path` is resolved against `options.base`, or against the
    /// directory of the calling source file when no base is given.
    ///
    /// # Errors
    /// [`EntryError::NotFoundFile`] if no file exists at the (active) path and
    /// no content was supplied.
    #[track_caller]
    pub fn new<P: AsRef<Path>>(path: P, options: FileOptions) -> Result<Self> {
        let base = PathBase::or_caller(options.base.as_deref());
        Self::build(parse_path(path, &base), options, false)
    }

    /// Builds an entry for an already resolved absolute path.
    pub(crate) fn at(path: PathBuf, options: FileOptions) -> Result<Self> {
        Self::build(parse_absolute(path), options, false)
    }

    /// `overwrite` makes the first load write the supplied content even if a
    /// file exists at the path, without flagging the entry as a copy.
    fn build(parsed: ParsedPath, options: FileOptions, overwrite: bool) -> Result<Self> {
        let real_exists = probe::is_file_sync(&parsed.path);
        let ids = resolve_identity(&parsed, EntryType::File, real_exists, options.mocked);
        let original_file_exists = real_exists && !options.is_copy;
        let file_exists = original_file_exists && !overwrite;

        if !file_exists && options.content.is_none() {
            return Err(EntryError::NotFoundFile(parsed.path).into());
        }

        Ok(Self {
            ids,
            mime: parsed.mime,
            extension: parsed.extension,
            is_copy: options.is_copy,
            original_file_exists,
            file_exists,
            content: options.content,
            times: Timestamps::default(),
            size: None,
        })
    }

    /// Checks whether a regular file exists at `path`.
    /// A relative `path` is resolved against the calling source file's directory.
    #[track_caller]
    pub fn exists_sync<P: AsRef<Path>>(path: P) -> bool {
        probe::is_file_sync(PathBase::caller().resolve(path))
    }

    /// Async counterpart of [`exists_sync`](Self::exists_sync).
    /// The path is resolved before the future is returned.
    #[track_caller]
    pub fn exists<P: AsRef<Path>>(path: P) -> impl Future<Output = bool> {
        let path = PathBase::caller().resolve(path);
        async move { probe::is_file(path).await }
    }

    /// Active absolute path.
    pub fn path(&self) -> &Path {
        &self.ids.active.path
    }

    pub fn dir(&self) -> &Path {
        &self.ids.active.dir
    }

    /// Base name without the extension.
    pub fn name(&self) -> &str {
        &self.ids.active.name
    }

    /// Base name with the extension.
    pub fn base(&self) -> &str {
        &self.ids.active.base
    }

    pub fn href(&self) -> &str {
        &self.ids.active.href
    }

    /// Identity derived from the path given at construction.
    pub fn original(&self) -> &PathIdentity {
        &self.ids.original
    }

    /// Identity actually in use; differs from [`original`](Self::original) for mocked entries.
    pub fn active(&self) -> &PathIdentity {
        &self.ids.active
    }

    pub fn is_mocked(&self) -> bool {
        self.ids.is_mocked()
    }

    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_copy(&self) -> bool {
        self.is_copy
    }

    pub fn original_file_exists(&self) -> bool {
        self.original_file_exists
    }

    pub fn file_exists(&self) -> bool {
        self.file_exists
    }

    /// Content held in memory, if any. See [`get_content_sync`](Self::get_content_sync).
    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.times.created_at
    }

    pub fn accessed_at(&self) -> Option<DateTime<Utc>> {
        self.times.accessed_at
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.times.modified_at
    }

    pub fn timestamps(&self) -> Timestamps {
        self.times
    }

    /// Size in bytes, known after the first load.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    fn ensure_present(&self) -> Result<()> {
        if !self.file_exists && self.content.is_none() {
            return Err(EntryError::NotFoundFile(self.ids.active.path.clone()).into());
        }
        Ok(())
    }

    /// The cached state already answers the request.
    fn is_fresh(&self, options: &LoadOptions) -> bool {
        options.is_internal
            && self.size.is_some()
            && (!options.with_content || self.content.is_some())
    }

    fn apply_metadata(&mut self, meta: &std::fs::Metadata) {
        self.times = Timestamps::from_metadata(meta);
        self.size = Some(meta.len());
    }

    fn warn_if_large(&self) {
        if let Some(size) = self.size.filter(|size| *size > LARGE_FILE_THRESHOLD) {
            tracing::warn!(
                path = %self.path().display(),
                size,
                "loading a file larger than {} MB into memory",
                LARGE_FILE_THRESHOLD / (1024 * 1024)
            );
        }
    }

    /// Removing the source after the copy would delete the copy as well.
    fn ensure_movable(&self, target: &Path) -> Result<()> {
        if target == self.path() {
            return Err(EntryError::MoveIntoItself {
                from: self.path().to_path_buf(),
                to: target.to_path_buf(),
            }
            .into());
        }
        Ok(())
    }

    fn mark_removed(&mut self) {
        self.content = None;
        self.times = Timestamps::default();
        self.size = None;
        self.file_exists = false;
        self.original_file_exists = false;
    }

    /// Reload after a write: content is re-read only if it was held.
    fn refresh_options(&self) -> LoadOptions {
        LoadOptions::new().with_content(self.content.is_some())
    }

    /// Loads metadata and, optionally, content.
    ///
    /// # Behavior
    /// 1. **Materialization**: if the file doesn't exist yet, the supplied
    ///    content is written to disk (parent folders are created).
    /// 2. **Fast path**: with `is_internal` set and metadata already known
    ///    (and content held, if requested) nothing else happens.
    /// 3. **Stat**: timestamps and size are refreshed.
    /// 4. **Content**: with `with_content` the whole file is read into memory.
    pub fn load_sync(&mut self, options: LoadOptions) -> Result<()> {
        self.ensure_present()?;

        if !self.file_exists {
            let path = &self.ids.active.path;
            utils::ensure_parent(path)?;
            std::fs::write(path, self.content.as_deref().unwrap_or_default())?;
            tracing::debug!(path = %path.display(), "materialized file");
            self.file_exists = true;
        }

        if self.is_fresh(&options) {
            return Ok(());
        }

        let meta = std::fs::metadata(self.path())?;
        self.apply_metadata(&meta);

        if options.with_content {
            self.warn_if_large();
            self.content = Some(std::fs::read(self.path())?);
        }
        Ok(())
    }

    /// Deletes the file and clears every derived field.
    ///
    /// # Errors
    /// [`EntryError::NotFoundFile`] if the entry was already removed.
    pub fn remove_sync(&mut self) -> Result<()> {
        if !self.file_exists {
            return Err(EntryError::NotFoundFile(self.ids.active.path.clone()).into());
        }
        std::fs::remove_file(self.path())?;
        tracing::debug!(path = %self.path().display(), "removed file");
        self.mark_removed();
        Ok(())
    }

    /// Returns the content, reading it from disk unless it is held in memory.
    /// * `save_content` - keep what was read on the entry.
    pub fn get_content_sync(&mut self, save_content: bool) -> Result<Vec<u8>> {
        if let Some(content) = &self.content {
            return Ok(content.clone());
        }
        self.load_sync(LoadOptions::new().internal(true))?;
        self.warn_if_large();
        let content = std::fs::read(self.path())?;
        if save_content {
            self.content = Some(content.clone());
        }
        Ok(content)
    }

    /// Copies the file to `target` and returns the new entry (`is_copy() == true`).
    /// A relative `target` is resolved against the calling source file's directory.
    #[track_caller]
    pub fn copy_to_sync<P: AsRef<Path>>(&mut self, target: P, options: CopyOptions) -> Result<FileEntry> {
        let target = PathBase::caller().resolve(target);
        self.transfer_sync(target, options, false)
    }

    /// Moves the file to `target`: the new entry is written, then this one is removed.
    /// The returned entry is not flagged as a copy.
    ///
    /// # Errors
    /// [`EntryError::MoveIntoItself`] if `target` is this file's own path.
    #[track_caller]
    pub fn move_to_sync<P: AsRef<Path>>(&mut self, target: P, options: CopyOptions) -> Result<FileEntry> {
        let target = PathBase::caller().resolve(target);
        self.ensure_movable(&target)?;
        let moved = self.transfer_sync(target, options, true)?;
        self.remove_sync()?;
        Ok(moved)
    }

    pub(crate) fn transfer_sync(
        &mut self,
        target: PathBuf,
        options: CopyOptions,
        relocate: bool,
    ) -> Result<FileEntry> {
        self.load_sync(LoadOptions::new().internal(true))?;
        let content = self.get_content_sync(false)?;
        let file_options = transfer_options(content, options, relocate);
        let mut entry = FileEntry::build(parse_absolute(target), file_options, relocate)?;
        entry.load_sync(LoadOptions::new().with_content(options.with_content))?;
        tracing::debug!(from = %self.path().display(), to = %entry.path().display(), relocate, "transferred file");
        Ok(entry)
    }

    /// Appends `data` to the end of the file.
    pub fn append_sync(&mut self, data: &[u8]) -> Result<()> {
        self.load_sync(LoadOptions::new().internal(true))?;
        let mut file = std::fs::OpenOptions::new().append(true).open(self.path())?;
        file.write_all(data)?;
        self.load_sync(self.refresh_options())
    }

    /// Inserts `data` before the current content.
    pub fn prepend_sync(&mut self, data: &[u8]) -> Result<()> {
        self.load_sync(LoadOptions::new().internal(true))?;
        let existing = std::fs::read(self.path())?;
        let mut combined = Vec::with_capacity(data.len() + existing.len());
        combined.extend_from_slice(data);
        combined.extend_from_slice(&existing);
        std::fs::write(self.path(), combined)?;
        self.load_sync(self.refresh_options())
    }

    /// Replaces the whole content with `data`.
    pub fn write_sync(&mut self, data: &[u8]) -> Result<()> {
        self.load_sync(LoadOptions::new().internal(true))?;
        std::fs::write(self.path(), data)?;
        self.load_sync(self.refresh_options())
    }

    /// Opens the file at the original path for reading.
    pub fn read_stream_sync(&self) -> Result<std::fs::File> {
        Ok(std::fs::File::open(&self.ids.original.path)?)
    }

    /// Opens (creating or truncating) the file at the original path for writing.
    pub fn write_stream_sync(&self) -> Result<std::fs::File> {
        utils::ensure_parent(&self.ids.original.path)?;
        Ok(std::fs::File::create(&self.ids.original.path)?)
    }

    /// Async counterpart of [`load_sync`](Self::load_sync).
    ///
    /// Unlike the blocking variant, the supplied content is dropped from
    /// memory as soon as it has been written to disk.
    pub async fn load(&mut self, options: LoadOptions) -> Result<()> {
        self.ensure_present()?;

        if !self.file_exists {
            let path = &self.ids.active.path;
            utils::ensure_parent_async(path).await?;
            tokio::fs::write(path, self.content.as_deref().unwrap_or_default()).await?;
            tracing::debug!(path = %path.display(), "materialized file");
            self.file_exists = true;
            self.content = None;
        }

        if self.is_fresh(&options) {
            return Ok(());
        }

        let meta = tokio::fs::metadata(self.path()).await?;
        self.apply_metadata(&meta);

        if options.with_content {
            self.warn_if_large();
            self.content = Some(tokio::fs::read(self.path()).await?);
        }
        Ok(())
    }

    /// Async counterpart of [`remove_sync`](Self::remove_sync).
    pub async fn remove(&mut self) -> Result<()> {
        if !self.file_exists {
            return Err(EntryError::NotFoundFile(self.ids.active.path.clone()).into());
        }
        tokio::fs::remove_file(self.path()).await?;
        tracing::debug!(path = %self.path().display(), "removed file");
        self.mark_removed();
        Ok(())
    }

    /// Async counterpart of [`get_content_sync`](Self::get_content_sync).
    pub async fn get_content(&mut self, save_content: bool) -> Result<Vec<u8>> {
        if let Some(content) = &self.content {
            return Ok(content.clone());
        }
        self.load(LoadOptions::new().internal(true)).await?;
        self.warn_if_large();
        let content = tokio::fs::read(self.path()).await?;
        if save_content {
            self.content = Some(content.clone());
        }
        Ok(content)
    }

    /// Async counterpart of [`copy_to_sync`](Self::copy_to_sync).
    /// The target is resolved before the future is returned.
    #[track_caller]
    pub fn copy_to<P: AsRef<Path>>(
        &mut self,
        target: P,
        options: CopyOptions,
    ) -> impl Future<Output = Result<FileEntry>> + '_ {
        let target = PathBase::caller().resolve(target);
        self.transfer(target, options, false)
    }

    /// Async counterpart of [`move_to_sync`](Self::move_to_sync).
    #[track_caller]
    pub fn move_to<P: AsRef<Path>>(
        &mut self,
        target: P,
        options: CopyOptions,
    ) -> impl Future<Output = Result<FileEntry>> + '_ {
        let target = PathBase::caller().resolve(target);
        async move {
            self.ensure_movable(&target)?;
            let moved = self.transfer(target, options, true).await?;
            self.remove().await?;
            Ok(moved)
        }
    }

    pub(crate) async fn transfer(
        &mut self,
        target: PathBuf,
        options: CopyOptions,
        relocate: bool,
    ) -> Result<FileEntry> {
        self.load(LoadOptions::new().internal(true)).await?;
        let content = self.get_content(false).await?;
        let file_options = transfer_options(content, options, relocate);
        let mut entry = FileEntry::build(parse_absolute(target), file_options, relocate)?;
        entry
            .load(LoadOptions::new().with_content(options.with_content))
            .await?;
        tracing::debug!(from = %self.path().display(), to = %entry.path().display(), relocate, "transferred file");
        Ok(entry)
    }

    /// Async counterpart of [`append_sync`](Self::append_sync).
    pub async fn append(&mut self, data: &[u8]) -> Result<()> {
        self.load(LoadOptions::new().internal(true)).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(self.path())
            .await?;
        file.write_all(data).await?;
        file.flush().await?;
        self.load(self.refresh_options()).await
    }

    /// Async counterpart of [`prepend_sync`](Self::prepend_sync).
    pub async fn prepend(&mut self, data: &[u8]) -> Result<()> {
        self.load(LoadOptions::new().internal(true)).await?;
        let existing = tokio::fs::read(self.path()).await?;
        let mut combined = Vec::with_capacity(data.len() + existing.len());
        combined.extend_from_slice(data);
        combined.extend_from_slice(&existing);
        tokio::fs::write(self.path(), combined).await?;
        self.load(self.refresh_options()).await
    }

    /// Async counterpart of [`write_sync`](Self::write_sync).
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.load(LoadOptions::new().internal(true)).await?;
        tokio::fs::write(self.path(), data).await?;
        self.load(self.refresh_options()).await
    }

    pub async fn read_stream(&self) -> Result<tokio::fs::File> {
        Ok(tokio::fs::File::open(&self.ids.original.path).await?)
    }

    pub async fn write_stream(&self) -> Result<tokio::fs::File> {
        utils::ensure_parent_async(&self.ids.original.path).await?;
        Ok(tokio::fs::File::create(&self.ids.original.path).await?)
    }
}

/// A copy is flagged `is_copy`; a relocation is not, but still overwrites the target.
fn transfer_options(content: Vec<u8>, options: CopyOptions, relocate: bool) -> FileOptions {
    FileOptions::new()
        .content(content)
        .copy(!relocate)
        .mocked(options.mocked)
}

fn parse_absolute(path: PathBuf) -> ParsedPath {
    let anchor = path.parent().map(Path::to_path_buf).unwrap_or_default();
    parse_path(path, &PathBase::Dir(anchor))
}
