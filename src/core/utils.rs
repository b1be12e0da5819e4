use std::path::{Component, Path, PathBuf};

/// Folds `.` and `..` components and drops trailing separators.
/// `..` never climbs above the first component (`/..` stays `/`).
pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(parent) = result.parent() {
                    result = parent.to_path_buf();
                }
            }
            _ => result.push(component),
        }
    }
    result
}

/// Returns a `file://` href for an absolute host path.
pub fn file_href<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref().to_string_lossy().replace('\\', "/");
    if path.starts_with('/') {
        format!("file://{}", path)
    } else {
        format!("file:///{}", path)
    }
}

/// Creates the parent directory of `path` (`mkdir -p`), if it has one.
pub fn ensure_parent<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    match path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Async counterpart of [`ensure_parent`].
pub async fn ensure_parent_async<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    match path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent).await,
        _ => Ok(()),
    }
}
