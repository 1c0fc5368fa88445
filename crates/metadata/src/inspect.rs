//! Read-only validation of candidate source directories.

use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use crate::{InspectError, Owner};

/// Ownership and permission bits of a validated source directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceInfo {
    path: PathBuf,
    owner: Owner,
    mode: u32,
}

impl SourceInfo {
    /// Path that was inspected.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Owner of the directory.
    pub const fn owner(&self) -> Owner {
        self.owner
    }

    /// Permission bits (including setuid, setgid and sticky).
    pub const fn mode(&self) -> u32 {
        self.mode
    }
}

/// Validates that `path` exists and is a directory, returning its owner and
/// permission bits.
///
/// Symlinks are followed, so an already relocated source reports the owner
/// and mode of its volatile copy.
pub fn inspect_source(path: &Path) -> Result<SourceInfo, InspectError> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Err(InspectError::Missing {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(InspectError::Stat {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if !metadata.is_dir() {
        return Err(InspectError::NotDirectory {
            path: path.to_path_buf(),
        });
    }

    Ok(SourceInfo {
        path: path.to_path_buf(),
        owner: Owner::new(metadata.uid(), metadata.gid()),
        mode: metadata.mode() & 0o7777,
    })
}

/// Returns the first existing proper ancestor of `path` that lacks the
/// execute bit for user, group or other.
///
/// Missing ancestors are skipped.
pub fn untraversable_ancestor(path: &Path) -> Option<PathBuf> {
    path.ancestors().skip(1).find_map(|ancestor| {
        let metadata = fs::metadata(ancestor).ok()?;
        (metadata.is_dir() && metadata.mode() & 0o111 != 0o111).then(|| ancestor.to_path_buf())
    })
}
