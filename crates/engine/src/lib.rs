#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `engine` keeps configured directories ("sources") relocated onto
//! volatile storage. A relocated source is a symlink to its volatile copy,
//! and the original data sits next to it in a backup directory:
//!
//! ```text
//! /home/u/Projects                   -> /vol/goanysync-1000-1000/home/u/Projects
//! /home/u/Projects-backup_goanysync     durable copy
//! ```
//!
//! # Design
//!
//! - [`layout`] maps sources to volatile and backup paths and decodes
//!   volatile paths back into the source and owner they stand for.
//! - [`Lock`] serialises whole invocations across processes.
//! - [`Orchestrator`] implements the verbs `check`, `prepare`, `flush`,
//!   `restore`, `start` and `stop`, and exposes [`orphans`] and
//!   [`status`] scans.
//! - [`Mirror`] is the copy tool seam; [`CommandMirror`] runs rsync.
//!
//! The filesystem is the only state. Nothing is recorded between runs; every
//! verb re-derives what it needs from the configuration and `lstat`.
//!
//! # Errors
//!
//! Per-source failures are [`SourceError`]s. They are logged, recorded as
//! [`Outcome::Skipped`] and never stop a verb. [`EngineError`] is reserved
//! for conditions that fail the verb as a whole, and [`LockError`] for the
//! lock.
//!
//! # Examples
//!
//! ```
//! use engine::{Layout, Orchestrator, Outcome, Mirror, MirrorError};
//! use logging::Logger;
//! use std::path::Path;
//!
//! struct NoCopy;
//! impl Mirror for NoCopy {
//!     fn mirror(&self, _: &Path, _: &Path) -> Result<(), MirrorError> {
//!         Ok(())
//!     }
//! }
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let source = temp.path().join("cache");
//! std::fs::create_dir(&source)?;
//!
//! let layout = Layout::new(temp.path().join("vol"));
//! let orchestrator = Orchestrator::new(layout, vec![source.clone()], NoCopy, Logger::silent());
//!
//! let report = orchestrator.prepare()?;
//! assert!(matches!(report.outcome(&source), Some(Outcome::Prepared)));
//! assert!(std::fs::symlink_metadata(&source)?.file_type().is_symlink());
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

#[cfg(not(unix))]
compile_error!("goanysync relies on symlinks and uid/gid ownership and only builds on Unix");

mod error;
pub mod layout;
mod links;
mod lock;
mod mirror;
mod orchestrator;
pub mod orphans;
mod repair;
mod report;
pub mod status;

pub use error::{EngineError, SourceError};
pub use layout::{BACKUP_SUFFIX, Decoded, Layout, MappedPaths, OWNER_PREFIX, VolatilePattern};
pub use lock::{DEFAULT_POLL_INTERVAL, LOCK_NAME, Lock, LockError, LockGuard};
pub use mirror::{CommandMirror, Mirror, MirrorError};
pub use orchestrator::Orchestrator;
pub use orphans::{Orphan, OrphanReport};
pub use repair::repair_source;
pub use report::{Outcome, SourceReport, Verb, VerbReport};
pub use status::{Capacity, SourceStatus, StatusReport};
