use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error produced when a filesystem mutation on a managed directory fails.
#[derive(Debug, Error)]
#[error("failed to {context} '{path}': {source}")]
pub struct MetadataError {
    context: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl MetadataError {
    /// Creates a new error from the failed action, the affected path and the
    /// underlying I/O error.
    pub fn new(context: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            context,
            path: path.into(),
            source,
        }
    }

    /// Returns the action that failed.
    #[must_use]
    pub const fn context(&self) -> &'static str {
        self.context
    }

    /// Returns the affected path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the underlying I/O error.
    #[must_use]
    pub const fn source_error(&self) -> &io::Error {
        &self.source
    }
}

/// A candidate source directory failed validation.
#[derive(Debug, Error)]
pub enum InspectError {
    /// Nothing exists at the path (or it is a dangling symlink).
    #[error("source '{path}' does not exist")]
    Missing {
        /// Offending path.
        path: PathBuf,
    },
    /// The path exists but is not a directory.
    #[error("source '{path}' is not a directory")]
    NotDirectory {
        /// Offending path.
        path: PathBuf,
    },
    /// Ownership or mode could not be read.
    #[error("failed to stat source '{path}': {source}")]
    Stat {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl InspectError {
    /// Returns the path that failed validation.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Missing { path } | Self::NotDirectory { path } | Self::Stat { path, .. } => path,
        }
    }
}

/// A security-sensitive directory cannot be trusted.
#[derive(Debug, Error)]
pub enum TrustError {
    /// The directory does not exist.
    #[error("'{path}' does not exist")]
    Missing {
        /// Offending path.
        path: PathBuf,
    },
    /// The path is not a real directory (symlinks are rejected).
    #[error("'{path}' is not a directory")]
    NotDirectory {
        /// Offending path.
        path: PathBuf,
    },
    /// The directory is writable by group or other.
    #[error("'{path}' is writable by group or other (mode {mode:04o})")]
    Writable {
        /// Offending path.
        path: PathBuf,
        /// Permission bits found.
        mode: u32,
    },
    /// The directory is owned by someone other than root or the caller.
    #[error("'{path}' is owned by uid {uid}, expected root or the current user")]
    Owner {
        /// Offending path.
        path: PathBuf,
        /// Owner found.
        uid: u32,
    },
    /// Metadata could not be read.
    #[error("failed to stat '{path}': {source}")]
    Stat {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}
