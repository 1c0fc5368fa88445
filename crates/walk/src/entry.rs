use std::fs;
use std::path::{Path, PathBuf};

/// One filesystem object seen by a [`Walker`](crate::Walker).
#[derive(Debug)]
pub struct WalkEntry {
    pub(crate) path: PathBuf,
    pub(crate) metadata: fs::Metadata,
}

impl WalkEntry {
    /// Absolute path of the object.
    #[must_use]
    pub fn full_path(&self) -> &Path {
        &self.path
    }

    /// `lstat` result captured when the entry was produced.
    #[must_use]
    pub fn metadata(&self) -> &fs::Metadata {
        &self.metadata
    }

    /// A real directory; symlinks to directories report `false`.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }
}
