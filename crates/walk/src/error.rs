use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A traversal step failed. The walk does not continue past it.
#[derive(Debug, Error)]
#[error("failed to {action} '{}': {source}", .path.display())]
pub struct WalkError {
    action: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl WalkError {
    pub(crate) const fn new(action: &'static str, path: PathBuf, source: io::Error) -> Self {
        Self {
            action,
            path,
            source,
        }
    }

    /// Path the failing step was applied to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reports whether the path did not exist.
    ///
    /// A missing traversal root and entries removed while the walk is
    /// running both surface this way.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == io::ErrorKind::NotFound
    }
}
