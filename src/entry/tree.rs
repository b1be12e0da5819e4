//! Tree traversal shared by the blocking and async folder APIs:
//! directory listing, construction of child entries and glob collection.

use std::path::{Path, PathBuf};

use futures::FutureExt;
use futures::future::BoxFuture;
use globset::{GlobBuilder, GlobMatcher};

use crate::core::options::{FileOptions, FolderOptions, LoadOptions};
use crate::core::{EntryType, Result};
use crate::entry::{FileEntry, FolderEntry};
use crate::error::EntryError;

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listed {
    pub path: PathBuf,
    pub kind: EntryType,
    pub len: u64,
}

impl Listed {
    fn new(path: PathBuf, meta: &std::fs::Metadata) -> Self {
        let kind = if meta.is_dir() {
            EntryType::Directory
        } else {
            EntryType::File
        };
        Self {
            path,
            kind,
            len: meta.len(),
        }
    }
}

/// Lists the immediate children of `dir`, sorted by name.
///
/// Links to files are followed. Links to directories are left out, so a link
/// pointing back at an ancestor can't make a recursive walk loop. Entries whose
/// metadata can't be read (broken links, files removed meanwhile) are skipped.
pub fn list_sync<P: AsRef<Path>>(dir: P) -> Result<Vec<Listed>> {
    let mut listed = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let is_link = entry.file_type().is_ok_and(|kind| kind.is_symlink());
        let path = entry.path();
        match std::fs::metadata(&path) {
            Ok(meta) if is_link && meta.is_dir() => skip_dir_link(&path),
            Ok(meta) => listed.push(Listed::new(path, &meta)),
            Err(err) => skip(&path, &err),
        }
    }
    sort_listing(&mut listed);
    Ok(listed)
}

/// Async counterpart of [`list_sync`].
pub async fn list<P: AsRef<Path>>(dir: P) -> Result<Vec<Listed>> {
    let mut listed = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let is_link = entry.file_type().await.is_ok_and(|kind| kind.is_symlink());
        let path = entry.path();
        match tokio::fs::metadata(&path).await {
            Ok(meta) if is_link && meta.is_dir() => skip_dir_link(&path),
            Ok(meta) => listed.push(Listed::new(path, &meta)),
            Err(err) => skip(&path, &err),
        }
    }
    sort_listing(&mut listed);
    Ok(listed)
}

fn skip(path: &Path, err: &std::io::Error) {
    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable entry");
}

fn skip_dir_link(path: &Path) {
    tracing::debug!(path = %path.display(), "skipping link to a directory");
}

fn sort_listing(listed: &mut [Listed]) {
    listed.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
}

/// Sum of the sizes of the files in a listing.
pub fn file_size(listed: &[Listed]) -> u64 {
    listed
        .iter()
        .filter(|entry| entry.kind.is_file())
        .map(|entry| entry.len)
        .sum()
}

/// A child entry built from a listing row.
#[derive(Debug)]
pub(crate) enum Child {
    File(FileEntry),
    Folder(FolderEntry),
}

impl Child {
    pub(crate) fn load_sync(&mut self, options: LoadOptions) -> Result<()> {
        match self {
            Child::File(file) => file.load_sync(options),
            Child::Folder(folder) => folder.load_sync(options),
        }
    }

    pub(crate) fn load(&mut self, options: LoadOptions) -> BoxFuture<'_, Result<()>> {
        match self {
            Child::File(file) => file.load(options).boxed(),
            Child::Folder(folder) => folder.load_boxed(options),
        }
    }
}

/// Builds one entry per listing row, in listing order.
///
/// A file that vanished since the listing is skipped, like unreadable rows
/// are skipped by [`list_sync`].
pub(crate) fn build_children(listed: &[Listed]) -> Vec<Child> {
    listed
        .iter()
        .filter_map(|entry| match entry.kind {
            EntryType::File => match FileEntry::at(entry.path.clone(), FileOptions::new()) {
                Ok(file) => Some(Child::File(file)),
                Err(err) => {
                    tracing::warn!(path = %entry.path.display(), error = %err, "skipping vanished file");
                    None
                }
            },
            EntryType::Directory => Some(Child::Folder(FolderEntry::at(
                entry.path.clone(),
                FolderOptions::new(),
            ))),
        })
        .collect()
}

/// Splits children into files and folders, each keeping listing order.
pub(crate) fn split_children(children: Vec<Child>) -> (Vec<FileEntry>, Vec<FolderEntry>) {
    let mut files = Vec::new();
    let mut folders = Vec::new();
    for child in children {
        match child {
            Child::File(file) => files.push(file),
            Child::Folder(folder) => folders.push(folder),
        }
    }
    (files, folders)
}

/// A compiled glob anchored at a folder.
///
/// Relative patterns are matched against paths relative to the folder;
/// absolute patterns against absolute paths.
#[derive(Debug, Clone)]
pub struct PatternQuery {
    matcher: Option<GlobMatcher>,
    absolute: bool,
}

impl PatternQuery {
    /// `None` matches everything.
    pub fn new(pattern: Option<&str>) -> Result<Self> {
        let Some(pattern) = pattern else {
            return Ok(Self {
                matcher: None,
                absolute: false,
            });
        };
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|source| EntryError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self {
            matcher: Some(glob.compile_matcher()),
            absolute: Path::new(pattern).is_absolute(),
        })
    }

    pub fn is_match(&self, root: &Path, path: &Path) -> bool {
        let Some(matcher) = &self.matcher else {
            return true;
        };
        if self.absolute {
            return matcher.is_match(path);
        }
        match path.strip_prefix(root) {
            Ok(relative) => matcher.is_match(relative),
            Err(_) => false,
        }
    }
}

/// Collects every file below `folder` (at any depth) matching `query`.
pub fn collect_files<'a>(folder: &'a FolderEntry, query: &PatternQuery) -> Vec<&'a FileEntry> {
    let mut found = Vec::new();
    collect_files_into(folder, folder.path(), query, &mut found);
    found
}

fn collect_files_into<'a>(
    folder: &'a FolderEntry,
    root: &Path,
    query: &PatternQuery,
    found: &mut Vec<&'a FileEntry>,
) {
    found.extend(
        folder
            .files()
            .iter()
            .filter(|file| query.is_match(root, file.path())),
    );
    for sub in folder.folders() {
        collect_files_into(sub, root, query, found);
    }
}

/// Collects every folder below `folder` (at any depth, `folder` excluded)
/// matching `query`. A match doesn't stop the descent into that folder.
pub fn collect_folders<'a>(folder: &'a FolderEntry, query: &PatternQuery) -> Vec<&'a FolderEntry> {
    let mut found = Vec::new();
    collect_folders_into(folder, folder.path(), query, &mut found);
    found
}

fn collect_folders_into<'a>(
    folder: &'a FolderEntry,
    root: &Path,
    query: &PatternQuery,
    found: &mut Vec<&'a FolderEntry>,
) {
    for sub in folder.folders() {
        if query.is_match(root, sub.path()) {
            found.push(sub);
        }
        collect_folders_into(sub, root, query, found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    mod listing {
        use super::*;

        #[test]
        fn test_list_sync_sorted_with_kinds() -> Result<()> {
            let temp_dir = setup_test_env();
            let root = temp_dir.path();

            let listed = list_sync(root)?;
            let names: Vec<_> = listed
                .iter()
                .map(|entry| entry.path.file_name().unwrap().to_string_lossy().into_owned())
                .collect();

            assert_eq!(names, vec!["a.txt", "b.bin", "empty", "sub"]);
            assert_eq!(listed[0].kind, EntryType::File);
            assert_eq!(listed[0].len, 3);
            assert_eq!(listed[2].kind, EntryType::Directory);
            assert_eq!(file_size(&listed), 3 + 5);

            Ok(())
        }

        #[tokio::test]
        async fn test_list_async_matches_sync() -> Result<()> {
            let temp_dir = setup_test_env();
            assert_eq!(list(temp_dir.path()).await?, list_sync(temp_dir.path())?);
            Ok(())
        }

        #[test]
        fn test_list_missing_dir_is_io_error() {
            let temp_dir = setup_test_env();
            let err = list_sync(temp_dir.path().join("nope")).unwrap_err();
            assert!(err.downcast_ref::<std::io::Error>().is_some());
        }

        #[cfg(unix)]
        #[test]
        fn test_list_skips_broken_symlink() -> Result<()> {
            let temp_dir = setup_test_env();
            std::os::unix::fs::symlink(
                temp_dir.path().join("nowhere"),
                temp_dir.path().join("dangling"),
            )?;

            let listed = list_sync(temp_dir.path())?;
            assert_eq!(listed.len(), 4);

            Ok(())
        }

        #[cfg(unix)]
        #[test]
        fn test_list_follows_file_links_only() -> Result<()> {
            let temp_dir = setup_test_env();
            let root = temp_dir.path();
            std::os::unix::fs::symlink(root, root.join("loop"))?;
            std::os::unix::fs::symlink(root.join("a.txt"), root.join("alias.txt"))?;

            let listed = list_sync(root)?;
            let names: Vec<_> = listed
                .iter()
                .map(|entry| entry.path.file_name().unwrap().to_string_lossy().into_owned())
                .collect();

            assert_eq!(names, vec!["a.txt", "alias.txt", "b.bin", "empty", "sub"]);
            assert_eq!(listed[1].kind, EntryType::File);
            assert_eq!(listed[1].len, 3);

            Ok(())
        }

        #[cfg(unix)]
        #[tokio::test]
        async fn test_list_async_skips_dir_links() -> Result<()> {
            let temp_dir = setup_test_env();
            let root = temp_dir.path();
            std::os::unix::fs::symlink(root, root.join("sub/up"))?;

            let listed = list(root.join("sub")).await?;
            assert_eq!(listed.len(), 1);
            assert_eq!(listed, list_sync(root.join("sub"))?);

            Ok(())
        }

        #[test]
        fn test_build_children_skips_vanished_file() -> Result<()> {
            let temp_dir = setup_test_env();
            let listed = list_sync(temp_dir.path())?;
            std::fs::remove_file(temp_dir.path().join("a.txt"))?;

            let (files, folders) = split_children(build_children(&listed));

            let files: Vec<_> = files.iter().map(|f| f.base().to_string()).collect();
            assert_eq!(files, vec!["b.bin"]);
            assert_eq!(folders.len(), 2);

            Ok(())
        }

        #[test]
        fn test_build_and_split_children_keep_order() -> Result<()> {
            let temp_dir = setup_test_env();
            let listed = list_sync(temp_dir.path())?;

            let (files, folders) = split_children(build_children(&listed));

            let files: Vec<_> = files.iter().map(|f| f.base().to_string()).collect();
            let folders: Vec<_> = folders.iter().map(|f| f.base().to_string()).collect();
            assert_eq!(files, vec!["a.txt", "b.bin"]);
            assert_eq!(folders, vec!["empty", "sub"]);

            Ok(())
        }
    }

    mod patterns {
        use super::*;

        #[test]
        fn test_relative_pattern_is_anchored() -> Result<()> {
            let root = Path::new("/project");
            let query = PatternQuery::new(Some("*.ts"))?;

            assert!(query.is_match(root, Path::new("/project/a.ts")));
            assert!(!query.is_match(root, Path::new("/project/sub/b.ts")));
            assert!(!query.is_match(root, Path::new("/elsewhere/a.ts")));

            let query = PatternQuery::new(Some("**/*.ts"))?;
            assert!(query.is_match(root, Path::new("/project/a.ts")));
            assert!(query.is_match(root, Path::new("/project/sub/deep/b.ts")));
            assert!(!query.is_match(root, Path::new("/project/a.txt")));

            Ok(())
        }

        #[test]
        fn test_braces_and_absolute_patterns() -> Result<()> {
            let root = Path::new("/project");
            let query = PatternQuery::new(Some("**/*.{ts,js}"))?;
            assert!(query.is_match(root, Path::new("/project/x/a.js")));
            assert!(query.is_match(root, Path::new("/project/a.ts")));

            let query = PatternQuery::new(Some("/project/sub/*"))?;
            assert!(query.is_match(root, Path::new("/project/sub/a")));
            assert!(!query.is_match(root, Path::new("/project/a")));

            Ok(())
        }

        #[test]
        fn test_no_pattern_matches_all() -> Result<()> {
            let query = PatternQuery::new(None)?;
            assert!(query.is_match(Path::new("/a"), Path::new("/b/c")));
            Ok(())
        }

        #[test]
        fn test_invalid_pattern() {
            let err = PatternQuery::new(Some("[unclosed")).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<EntryError>(),
                Some(EntryError::Pattern { pattern, .. }) if pattern == "[unclosed"
            ));
        }
    }

    // Helper function: a.txt, b.bin, empty/, sub/c.txt
    fn setup_test_env() -> TempDir {
        let temp_dir = TempDir::new("tree_test").unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("sub")).unwrap();
        std::fs::create_dir_all(root.join("empty")).unwrap();
        std::fs::write(root.join("b.bin"), b"12345").unwrap();
        std::fs::write(root.join("a.txt"), b"abc").unwrap();
        std::fs::write(root.join("sub/c.txt"), b"c").unwrap();
        temp_dir
    }
}
