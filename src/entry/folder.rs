//! A directory tree, real or mocked, loaded lazily.
//!
//! Like [`FileEntry`], every operation has a blocking (`*_sync`) and an async
//! variant. In the async variant the children of one folder are loaded
//! concurrently; `files` and `folders` still follow listing order.

use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};

use crate::core::identity::{Identities, PathIdentity, resolve_identity};
use crate::core::options::{CopyOptions, FolderOptions, LoadOptions};
use crate::core::parse::{ParsedPath, PathBase, parse_path};
use crate::core::{EntryType, Result, probe};
use crate::entry::tree::{self, Child, Listed, PatternQuery};
use crate::entry::{FileEntry, Timestamps};
use crate::error::EntryError;

/// A directory on the host and, once loaded with `with_sub`, a snapshot of
/// everything below it.
///
/// `files()` and `folders()` are rebuilt wholesale by every recursive load and
/// never patched in place: call `load`/`load_sync` again (or run a pattern
/// query) to observe changes made on disk by others.
///
/// ### Example
/// ```no_run
/// use entry_kit::{CopyOptions, FolderEntry, FolderOptions};
///
/// let mut src = FolderEntry::new("/tmp/project", FolderOptions::new());
/// for file in src.get_files_by_pattern_sync(Some("**/*.rs"))? {
///     println!("{}", file.path().display());
/// }
///
/// let mut backup = src.copy_to_sync("/tmp/project-backup", CopyOptions::new())?;
/// backup.remove_sync()?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct FolderEntry {
    ids: Identities,
    is_copy: bool,
    original_folder_exists: bool,
    folder_exists: bool,
    files: Vec<FileEntry>,
    folders: Vec<FolderEntry>,
    loaded_sub: Option<bool>, // Some(with_content) once children were built
    times: Timestamps,
    size: Option<u64>,
}

impl FolderEntry {
    /// Builds an entry for `path`. Never fails: a missing folder is created by
    /// the first load.
    ///
    /// A relative `path` is resolved against `options.base`, or against the
    /// directory of the calling source file when no base is given.
    #[track_caller]
    pub fn new<P: AsRef<Path>>(path: P, options: FolderOptions) -> Self {
        let base = PathBase::or_caller(options.base.as_deref());
        Self::build(parse_path(path, &base), options)
    }

    pub(crate) fn at(path: PathBuf, options: FolderOptions) -> Self {
        Self::build(parse_absolute(path), options)
    }

    fn build(parsed: ParsedPath, options: FolderOptions) -> Self {
        let real_exists = probe::is_dir_sync(&parsed.path);
        let ids = resolve_identity(&parsed, EntryType::Directory, real_exists, options.mocked);
        let original_folder_exists = real_exists && !options.is_copy;

        Self {
            ids,
            is_copy: options.is_copy,
            original_folder_exists,
            folder_exists: original_folder_exists,
            files: Vec::new(),
            folders: Vec::new(),
            loaded_sub: None,
            times: Timestamps::default(),
            size: None,
        }
    }

    /// Checks whether a directory exists at `path`.
    #[track_caller]
    pub fn exists_sync<P: AsRef<Path>>(path: P) -> bool {
        probe::is_dir_sync(PathBase::caller().resolve(path))
    }

    /// Async counterpart of [`exists_sync`](Self::exists_sync).
    #[track_caller]
    pub fn exists<P: AsRef<Path>>(path: P) -> impl Future<Output = bool> {
        let path = PathBase::caller().resolve(path);
        async move { probe::is_dir(path).await }
    }

    pub fn path(&self) -> &Path {
        &self.ids.active.path
    }

    pub fn dir(&self) -> &Path {
        &self.ids.active.dir
    }

    pub fn name(&self) -> &str {
        &self.ids.active.name
    }

    pub fn base(&self) -> &str {
        &self.ids.active.base
    }

    pub fn href(&self) -> &str {
        &self.ids.active.href
    }

    pub fn original(&self) -> &PathIdentity {
        &self.ids.original
    }

    pub fn active(&self) -> &PathIdentity {
        &self.ids.active
    }

    pub fn is_mocked(&self) -> bool {
        self.ids.is_mocked()
    }

    pub fn is_copy(&self) -> bool {
        self.is_copy
    }

    pub fn original_folder_exists(&self) -> bool {
        self.original_folder_exists
    }

    pub fn folder_exists(&self) -> bool {
        self.folder_exists
    }

    /// Files directly inside this folder, as of the last recursive load.
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Folders directly inside this folder, as of the last recursive load.
    pub fn folders(&self) -> &[FolderEntry] {
        &self.folders
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

    /// Immediate files only after a flat load, whole subtree after a recursive one.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Sum of the sizes of every loaded file below this folder.
    pub fn total_size(&self) -> u64 {
        let files: u64 = self.files.iter().filter_map(FileEntry::size).sum();
        let folders: u64 = self.folders.iter().map(FolderEntry::total_size).sum();
        files + folders
    }

    fn is_fresh(&self, options: &LoadOptions) -> bool {
        options.is_internal
            && self.size.is_some()
            && (!options.with_sub
                || self
                    .loaded_sub
                    .is_some_and(|with_content| with_content || !options.with_content))
    }

    fn adopt(&mut self, children: Vec<Child>, with_content: bool) {
        let (files, folders) = tree::split_children(children);
        self.files = files;
        self.folders = folders;
        self.loaded_sub = Some(with_content);
    }

    fn apply_metadata(&mut self, meta: &std::fs::Metadata, listed: &[Listed], recursive: bool) {
        self.times = Timestamps::from_metadata(meta);
        self.size = Some(if recursive {
            self.total_size()
        } else {
            tree::file_size(listed)
        });
    }

    /// Removing the source after the copy would delete the copy as well.
    fn ensure_movable(&self, target: &Path) -> Result<()> {
        if target.starts_with(self.path()) {
            return Err(EntryError::MoveIntoItself {
                from: self.path().to_path_buf(),
                to: target.to_path_buf(),
            }
            .into());
        }
        Ok(())
    }

    fn mark_removed(&mut self) {
        self.files.clear();
        self.folders.clear();
        self.loaded_sub = None;
        self.times = Timestamps::default();
        self.size = None;
        self.folder_exists = false;
        self.original_folder_exists = false;
    }

    fn not_found(&self) -> anyhow::Error {
        EntryError::NotFoundFolder(self.ids.active.path.clone()).into()
    }

    /// Root of a copied/moved tree, before its children are transferred.
    fn transfer_root(target: PathBuf, options: CopyOptions, relocate: bool) -> Self {
        Self::at(
            target,
            FolderOptions::new().copy(!relocate).mocked(options.mocked),
        )
    }

    /// Records that the children of a copied/moved tree are in place.
    fn seal_transfer(&mut self, with_content: bool) {
        self.loaded_sub = Some(with_content);
        self.size = Some(self.total_size());
    }

    /// Creates the folder if needed and refreshes its metadata.
    ///
    /// # Behavior
    /// - **Fast path**: with `is_internal` set and metadata already known
    ///   (and the subtree loaded, if requested) nothing else happens.
    /// - **`with_sub`**: every child is built from the listing and loaded
    ///   recursively with `is_internal` and the same `with_content`, strictly
    ///   in listing order.
    pub fn load_sync(&mut self, options: LoadOptions) -> Result<()> {
        if !self.folder_exists {
            std::fs::create_dir_all(self.path())?;
            tracing::debug!(path = %self.path().display(), "created folder");
            self.folder_exists = true;
        }

        if self.is_fresh(&options) {
            return Ok(());
        }

        let meta = std::fs::metadata(self.path())?;
        let listed = tree::list_sync(self.path())?;

        if options.with_sub {
            let mut children = tree::build_children(&listed);
            let child_options = options.for_children();
            for child in &mut children {
                child.load_sync(child_options)?;
            }
            self.adopt(children, options.with_content);
        }

        self.apply_metadata(&meta, &listed, options.with_sub);
        Ok(())
    }

    /// Deletes the folder with everything in it.
    ///
    /// # Errors
    /// [`EntryError::NotFoundFolder`] if the entry was already removed.
    pub fn remove_sync(&mut self) -> Result<()> {
        if !self.folder_exists {
            return Err(self.not_found());
        }
        std::fs::remove_dir_all(self.path())?;
        tracing::debug!(path = %self.path().display(), "removed folder");
        self.mark_removed();
        Ok(())
    }

    /// Copies the whole tree to `target` and returns the new root.
    ///
    /// Every file and folder of the result is flagged `is_copy`. The source
    /// is only loaded, never modified. On the first I/O error the copy stops,
    /// leaving what was already written in place.
    #[track_caller]
    pub fn copy_to_sync<P: AsRef<Path>>(&mut self, target: P, options: CopyOptions) -> Result<FolderEntry> {
        let target = PathBase::caller().resolve(target);
        self.transfer_sync(target, options, false)
    }

    /// Moves the whole tree to `target`: the destination tree is built
    /// completely, then the source folder is removed.
    ///
    /// # Errors
    /// [`EntryError::MoveIntoItself`] if `target` is this folder or lies inside it;
    /// nothing is written in that case.
    #[track_caller]
    pub fn move_to_sync<P: AsRef<Path>>(&mut self, target: P, options: CopyOptions) -> Result<FolderEntry> {
        let target = PathBase::caller().resolve(target);
        self.ensure_movable(&target)?;
        let moved = self.transfer_sync(target, options, true)?;
        self.remove_sync()?;
        Ok(moved)
    }

    fn transfer_sync(&mut self, target: PathBuf, options: CopyOptions, relocate: bool) -> Result<FolderEntry> {
        self.load_sync(LoadOptions::new().with_sub(true).internal(true))?;

        let mut root = Self::transfer_root(target, options, relocate);
        root.load_sync(LoadOptions::new())?;

        let child_options = CopyOptions::new().with_content(options.with_content);
        for file in &mut self.files {
            let dest = root.path().join(file.base());
            let copied = file.transfer_sync(dest, child_options, relocate)?;
            root.files.push(copied);
        }
        for folder in &mut self.folders {
            let dest = root.path().join(folder.base());
            let copied = folder.transfer_sync(dest, child_options, relocate)?;
            root.folders.push(copied);
        }

        root.seal_transfer(options.with_content);
        tracing::debug!(from = %self.path().display(), to = %root.path().display(), relocate, "transferred folder");
        Ok(root)
    }

    /// Every file below this folder, at any depth, whose path matches `pattern`.
    ///
    /// A relative pattern is anchored at this folder (`*.rs` only matches
    /// direct children, `**/*.rs` matches at any depth); `None` returns all
    /// files. The tree is reloaded from disk first.
    pub fn get_files_by_pattern_sync(&mut self, pattern: Option<&str>) -> Result<Vec<&FileEntry>> {
        let query = PatternQuery::new(pattern)?;
        self.load_sync(LoadOptions::new().with_sub(true))?;
        Ok(tree::collect_files(self, &query))
    }

    /// Every folder below this one, at any depth, whose path matches `pattern`.
    /// Matching folders are still descended into.
    pub fn get_folders_by_pattern_sync(&mut self, pattern: Option<&str>) -> Result<Vec<&FolderEntry>> {
        let query = PatternQuery::new(pattern)?;
        self.load_sync(LoadOptions::new().with_sub(true))?;
        Ok(tree::collect_folders(self, &query))
    }

    /// Async counterpart of [`load_sync`](Self::load_sync); children of one
    /// folder are loaded concurrently.
    pub async fn load(&mut self, options: LoadOptions) -> Result<()> {
        self.load_boxed(options).await
    }

    pub(crate) fn load_boxed(&mut self, options: LoadOptions) -> BoxFuture<'_, Result<()>> {
        async move {
            if !self.folder_exists {
                tokio::fs::create_dir_all(self.path()).await?;
                tracing::debug!(path = %self.path().display(), "created folder");
                self.folder_exists = true;
            }

            if self.is_fresh(&options) {
                return Ok(());
            }

            let meta = tokio::fs::metadata(self.path()).await?;
            let listed = tree::list(self.path()).await?;

            if options.with_sub {
                let mut children = tree::build_children(&listed);
                let child_options = options.for_children();
                try_join_all(children.iter_mut().map(|child| child.load(child_options))).await?;
                self.adopt(children, options.with_content);
            }

            self.apply_metadata(&meta, &listed, options.with_sub);
            Ok(())
        }
        .boxed()
    }

    /// Async counterpart of [`remove_sync`](Self::remove_sync).
    pub async fn remove(&mut self) -> Result<()> {
        if !self.folder_exists {
            return Err(self.not_found());
        }
        tokio::fs::remove_dir_all(self.path()).await?;
        tracing::debug!(path = %self.path().display(), "removed folder");
        self.mark_removed();
        Ok(())
    }

    /// Async counterpart of [`copy_to_sync`](Self::copy_to_sync).
    /// The target is resolved before the future is returned.
    #[track_caller]
    pub fn copy_to<P: AsRef<Path>>(
        &mut self,
        target: P,
        options: CopyOptions,
    ) -> impl Future<Output = Result<FolderEntry>> + '_ {
        let target = PathBase::caller().resolve(target);
        self.transfer(target, options, false)
    }

    /// Async counterpart of [`move_to_sync`](Self::move_to_sync).
    #[track_caller]
    pub fn move_to<P: AsRef<Path>>(
        &mut self,
        target: P,
        options: CopyOptions,
    ) -> impl Future<Output = Result<FolderEntry>> + '_ {
        let target = PathBase::caller().resolve(target);
        async move {
            self.ensure_movable(&target)?;
            let moved = self.transfer(target, options, true).await?;
            self.remove().await?;
            Ok(moved)
        }
    }

    // Children are transferred one after another so the first error stops the walk.
    fn transfer(
        &mut self,
        target: PathBuf,
        options: CopyOptions,
        relocate: bool,
    ) -> BoxFuture<'_, Result<FolderEntry>> {
        async move {
            self.load(LoadOptions::new().with_sub(true).internal(true))
                .await?;

            let mut root = Self::transfer_root(target, options, relocate);
            root.load(LoadOptions::new()).await?;

            let child_options = CopyOptions::new().with_content(options.with_content);
            for file in &mut self.files {
                let dest = root.path().join(file.base());
                let copied = file.transfer(dest, child_options, relocate).await?;
                root.files.push(copied);
            }
            for folder in &mut self.folders {
                let dest = root.path().join(folder.base());
                let copied = folder.transfer(dest, child_options, relocate).await?;
                root.folders.push(copied);
            }

            root.seal_transfer(options.with_content);
            tracing::debug!(from = %self.path().display(), to = %root.path().display(), relocate, "transferred folder");
            Ok(root)
        }
        .boxed()
    }

    /// Async counterpart of [`get_files_by_pattern_sync`](Self::get_files_by_pattern_sync).
    pub async fn get_files_by_pattern(&mut self, pattern: Option<&str>) -> Result<Vec<&FileEntry>> {
        let query = PatternQuery::new(pattern)?;
        self.load(LoadOptions::new().with_sub(true)).await?;
        Ok(tree::collect_files(self, &query))
    }

    /// Async counterpart of [`get_folders_by_pattern_sync`](Self::get_folders_by_pattern_sync).
    pub async fn get_folders_by_pattern(&mut self, pattern: Option<&str>) -> Result<Vec<&FolderEntry>> {
        let query = PatternQuery::new(pattern)?;
        self.load(LoadOptions::new().with_sub(true)).await?;
        Ok(tree::collect_folders(self, &query))
    }
}

fn parse_absolute(path: PathBuf) -> ParsedPath {
    let anchor = path.parent().map(Path::to_path_buf).unwrap_or_default();
    parse_path(path, &PathBase::Dir(anchor))
}
