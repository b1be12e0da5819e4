//! Path parsing: resolution of relative paths against the caller location,
//! name/extension splitting and MIME lookup.
//!
//! Relative paths are resolved against the directory of the *source file* that
//! called into the crate, not against the process working directory. The caller
//! is captured with `#[track_caller]`, so every public function that accepts a
//! path and may resolve it is itself `#[track_caller]`, and the capture happens
//! before any `.await`.

use std::panic::Location;
use std::path::{Path, PathBuf};

use crate::core::utils;

/// Two-segment suffixes that form a single extension.
pub const COMPOUND_EXTENSIONS: &[&str] = &[".d.ts", ".d.mts", ".d.cts", ".js.map", ".css.map"];

/// Where relative paths are anchored.
#[derive(Debug, Clone, PartialEq)]
pub enum PathBase {
    /// Directory of the source file at this location.
    Caller(&'static Location<'static>),
    /// Explicit directory. A relative one is taken from the working directory.
    Dir(PathBuf),
}

impl PathBase {
    /// Captures the location of the calling code.
    #[track_caller]
    pub fn caller() -> Self {
        PathBase::Caller(Location::caller())
    }

    /// Uses `base` when given, otherwise the calling code's location.
    #[track_caller]
    pub fn or_caller(base: Option<&Path>) -> Self {
        match base {
            Some(dir) => PathBase::Dir(dir.to_path_buf()),
            None => PathBase::caller(),
        }
    }

    /// Absolute directory relative paths are joined onto.
    pub fn dir(&self) -> PathBuf {
        match self {
            PathBase::Caller(location) => {
                let file = source_file(location.file());
                file.parent().map(Path::to_path_buf).unwrap_or(file)
            }
            PathBase::Dir(dir) => absolutize(dir),
        }
    }

    /// Resolves `path` into an absolute, normalized path.
    pub fn resolve<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            utils::normalize(path)
        } else {
            utils::normalize(self.dir().join(path))
        }
    }
}

/// Absolute path of the source file calling this function.
#[track_caller]
pub fn this_file() -> PathBuf {
    source_file(Location::caller().file())
}

/// Directory of the source file calling this function.
#[track_caller]
pub fn this_dir() -> PathBuf {
    PathBase::caller().dir()
}

fn source_file(file: &str) -> PathBuf {
    utils::normalize(absolutize(Path::new(file)))
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Decomposed absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    /// Absolute, normalized path.
    pub path: PathBuf,
    /// Parent directory.
    pub dir: PathBuf,
    /// Final component, extension included.
    pub base: String,
    /// Final component without its extension.
    pub name: String,
    /// Extension with its leading dot, or empty.
    pub extension: String,
    /// MIME type guessed from the extension.
    pub mime: Option<String>,
}

/// Parses `path`, resolving it against `base` when it is relative.
///
/// No I/O is performed apart from reading the working directory when the
/// anchor itself is relative.
///
/// # Example
/// ```
/// use entry_kit::{parse_path, PathBase};
///
/// let parsed = parse_path("pkg/types/index.d.ts", &PathBase::Dir("/srv".into()));
/// assert_eq!(parsed.name, "index");
/// assert_eq!(parsed.extension, ".d.ts");
/// assert_eq!(parsed.dir, std::path::Path::new("/srv/pkg/types"));
/// ```
pub fn parse_path<P: AsRef<Path>>(path: P, base: &PathBase) -> ParsedPath {
    let path = base.resolve(path);
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| path.clone());
    let base_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (name, extension) = split_extension(&base_name);
    let mime = mime_for(&dir, &base_name);

    ParsedPath {
        path,
        dir,
        base: base_name,
        name,
        extension,
        mime,
    }
}

/// Splits a base name into `(name, extension)`.
///
/// Compound extensions win; otherwise the extension starts at the first dot
/// that is not the leading character (`archive.tar.gz` -> `archive`, `.tar.gz`).
pub fn split_extension(base: &str) -> (String, String) {
    if let Some(ext) = COMPOUND_EXTENSIONS
        .iter()
        .find(|ext| base.len() > ext.len() && base.ends_with(*ext))
    {
        let cut = base.len() - ext.len();
        return (base[..cut].to_string(), ext.to_string());
    }

    match base.char_indices().skip(1).find(|(_, ch)| *ch == '.') {
        Some((pos, _)) => (base[..pos].to_string(), base[pos..].to_string()),
        None => (base.to_string(), String::new()),
    }
}

/// Looks up the MIME type for `dir/base`. Unknown extensions yield `None`.
pub fn mime_for<P: AsRef<Path>>(dir: P, base: &str) -> Option<String> {
    mime_guess::from_path(dir.as_ref().join(base))
        .first_raw()
        .map(str::to_string)
}
