use std::path::PathBuf;

use thiserror::Error;

/// Typed failures raised by entries themselves.
///
/// Every other failure is the underlying I/O error, passed through unchanged
/// inside the crate's `anyhow::Error`.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("file not found: {}", .0.display())]
    NotFoundFile(PathBuf),
    #[error("folder not found: {}", .0.display())]
    NotFoundFolder(PathBuf),
    #[error("cannot move {} into itself ({})", .from.display(), .to.display())]
    MoveIntoItself { from: PathBuf, to: PathBuf },
    #[error("invalid glob pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

impl EntryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFoundFile(_) | Self::NotFoundFolder(_))
    }
}

/// Returns true if `err` is a [`EntryError::NotFoundFile`] or [`EntryError::NotFoundFolder`].
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<EntryError>()
        .is_some_and(EntryError::is_not_found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        let err = anyhow::Error::new(EntryError::NotFoundFile(PathBuf::from("/a.txt")));
        assert!(is_not_found(&err));
        assert_eq!(err.to_string(), "file not found: /a.txt");

        let err = anyhow::Error::new(EntryError::NotFoundFolder(PathBuf::from("/a")));
        assert!(is_not_found(&err));

        let err = anyhow::Error::new(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(!is_not_found(&err));
    }

    #[test]
    fn test_move_into_itself_message() {
        let err = EntryError::MoveIntoItself {
            from: PathBuf::from("/a"),
            to: PathBuf::from("/a/b"),
        };
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "cannot move /a into itself (/a/b)");
    }
}
