use std::io;
use std::path::PathBuf;

use metadata::{InspectError, MetadataError};
use thiserror::Error;
use walk::WalkError;

use crate::mirror::MirrorError;
use crate::orphans::OrphanReport;

/// A transition could not be applied to one source.
///
/// These are logged and recorded in the verb's report; the verb carries on
/// with the next source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source failed inspection.
    #[error(transparent)]
    Invalid(#[from] InspectError),
    /// The volatile directory chain could not be created.
    #[error(transparent)]
    VolatileDir(#[from] MetadataError),
    /// The source is a symlink that goanysync did not create for it.
    #[error("'{path}' is a symlink to '{target}', not to its volatile copy")]
    ForeignLink {
        /// The configured source.
        path: PathBuf,
        /// Where the link points.
        target: PathBuf,
    },
    /// The source is not relocated, so there is nothing to flush or restore.
    #[error("'{path}' is not relocated")]
    NotRelocated {
        /// The configured source.
        path: PathBuf,
    },
    /// A backup is already present next to an unrelocated source.
    #[error("backup '{backup}' already exists")]
    BackupExists {
        /// Backup path found.
        backup: PathBuf,
    },
    /// The source is relocated but its backup directory is gone.
    #[error("backup '{backup}' is missing")]
    BackupMissing {
        /// Expected backup path.
        backup: PathBuf,
    },
    /// The source links to a volatile copy that does not exist.
    #[error("volatile copy '{volatile}' is missing")]
    VolatileMissing {
        /// Expected volatile path.
        volatile: PathBuf,
    },
    /// A filesystem step failed.
    #[error("failed to {action} '{path}': {error}")]
    Io {
        /// The step that failed.
        action: &'static str,
        /// Path it failed on.
        path: PathBuf,
        /// Underlying error.
        #[source]
        error: io::Error,
    },
    /// The copy tool failed.
    #[error(transparent)]
    Mirror(#[from] MirrorError),
    /// `stop` could not write the volatile copy back, so the source stays
    /// relocated and its volatile copy is kept.
    #[error("'{path}' was not written back and stays relocated")]
    Unflushed {
        /// The configured source.
        path: PathBuf,
    },
}

impl SourceError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            error,
        }
    }
}

/// A verb failed as a whole.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The volatile root could not be created or opened up for traversal.
    #[error("volatile root unusable: {0}")]
    VolatileRoot(#[source] MetadataError),
    /// `start` found orphaned volatile directories and refused to proceed.
    #[error("refusing to start: {} orphaned volatile path(s) found", .report.len())]
    OrphansFound {
        /// What the scan found.
        report: OrphanReport,
    },
    /// `stop` finished but volatile storage still holds unmanaged data.
    #[error("{} orphaned volatile path(s) left after stop", .report.len())]
    OrphansLeft {
        /// What the scan found.
        report: OrphanReport,
    },
    /// `stop` left sources relocated because their flush failed.
    #[error("{} source(s) could not be written back and stay relocated", .sources.len())]
    Unflushed {
        /// Sources still relocated.
        sources: Vec<PathBuf>,
    },
    /// Volatile storage could not be scanned.
    #[error("failed to scan volatile storage: {0}")]
    Scan(#[from] WalkError),
}
