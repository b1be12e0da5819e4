//! Original and active identity of an entry.
//!
//! Both are computed exactly once, when the entry is built, and never change
//! afterwards.

use std::path::PathBuf;

use crate::core::parse::ParsedPath;
use crate::core::{EntryType, mock, utils};

/// Location and naming of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathIdentity {
    pub dir: PathBuf,
    pub name: String,
    pub base: String,
    pub path: PathBuf,
    pub href: String,
}

impl PathIdentity {
    fn new(dir: PathBuf, name: String, base: String) -> Self {
        let path = dir.join(&base);
        let href = utils::file_href(&path);
        Self {
            dir,
            name,
            base,
            path,
            href,
        }
    }
}

/// Identity pair of an entry: what was asked for and what is actually used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identities {
    pub original: PathIdentity,
    pub active: PathIdentity,
}

impl Identities {
    pub fn is_mocked(&self) -> bool {
        self.original != self.active
    }
}

/// Builds the identities of an entry of type `kind` located at `parsed`.
///
/// The active identity differs from the original only when `mocked` is set and
/// nothing exists at the original path (`exists == false`): the entry then gets
/// a random name in the same directory, keeping the file extension.
pub fn resolve_identity(
    parsed: &ParsedPath,
    kind: EntryType,
    exists: bool,
    mocked: bool,
) -> Identities {
    let name = match kind {
        EntryType::File => parsed.name.clone(),
        EntryType::Directory => parsed.base.clone(),
    };
    let original = PathIdentity::new(parsed.dir.clone(), name, parsed.base.clone());

    if !mocked || exists {
        return Identities {
            active: original.clone(),
            original,
        };
    }

    let token = mock::mock_name();
    let base = match kind {
        EntryType::File => format!("{}{}", token, parsed.extension),
        EntryType::Directory => token.clone(),
    };
    let active = PathIdentity::new(parsed.dir.clone(), token, base);
    tracing::debug!(original = %original.path.display(), active = %active.path.display(), "mocked identity");

    Identities { original, active }
}
