//! Lazily-loaded file and folder entries for Rust, real or mocked.
//! Ideal for fixtures in tests, scaffolding tools, and code that walks,
//! copies, or pattern-matches directory trees.
//!
//! ### Overview
//!
//! `entry-kit` models a host file as a [`FileEntry`] and a directory tree as a
//! [`FolderEntry`]. Creating an entry never touches more than a metadata probe;
//! content, timestamps and children are brought in by an explicit `load`.
//! Every operation comes twice with the same contract: a blocking `*_sync`
//! variant and an `async` one running on tokio.
//!
//! **Key ideas**:
//! - **Caller-relative paths**: a relative path is resolved against the
//!   directory of the source file that calls the API (or an explicit `base`).
//! - **Mocking**: an entry created with `mocked(true)` for a path that doesn't
//!   exist gets a random name in the same folder, so tests never collide.
//! - **Lazy materialization**: a `FileEntry` built from in-memory content is
//!   written to disk on its first load; a `FolderEntry` is created on its first load.
//! - **Snapshots**: `files()` / `folders()` reflect the last recursive load
//!   only; reload to observe external changes.
//!
//! ### Example
//! ```no_run
//! use entry_kit::{FileEntry, FileOptions, FolderEntry, FolderOptions, LoadOptions};
//!
//! let mut file = FileEntry::new("/tmp/demo/a.txt", FileOptions::new().content("hello"))?;
//! file.load_sync(LoadOptions::new())?;
//!
//! let mut folder = FolderEntry::new("/tmp/demo", FolderOptions::new());
//! folder.load_sync(LoadOptions::new().with_sub(true))?;
//! assert_eq!(folder.files().len(), 1);
//! # Ok::<(), anyhow::Error>(())
//! ```

mod core;
pub mod entry;
pub mod error;

pub use core::identity::{Identities, PathIdentity};
pub use core::mock::{MOCK_NAME_BYTES, mock_name};
pub use core::options::{CopyOptions, FileOptions, FolderOptions, LARGE_FILE_THRESHOLD, LoadOptions};
pub use core::parse::{COMPOUND_EXTENSIONS, ParsedPath, PathBase, parse_path, this_dir, this_file};
pub use core::probe;
pub use core::{EntryType, Result};
pub use entry::{FileEntry, FolderEntry, Timestamps};
pub use error::{EntryError, is_not_found};
