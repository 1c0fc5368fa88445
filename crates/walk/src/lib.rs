#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `walk` is the traversal goanysync uses over volatile storage. Entries
//! come out depth-first in byte order of their names, symlinks are reported
//! but never entered, and a directory's subtree can be pruned as soon as
//! the directory itself has been seen.
//!
//! [`disk_usage`] builds on the same walker to total a tree the way `du`
//! does.
//!
//! # Examples
//!
//! ```
//! use walk::WalkBuilder;
//! use std::fs;
//! use std::path::PathBuf;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let root = temp.path();
//! fs::create_dir_all(root.join("keep/inner"))?;
//! fs::create_dir_all(root.join("prune/inner"))?;
//!
//! let mut walker = WalkBuilder::new(root).include_root(false).build()?;
//! let mut seen = Vec::new();
//! while let Some(entry) = walker.next() {
//!     let entry = entry?;
//!     let relative = entry.full_path().strip_prefix(root)?.to_path_buf();
//!     if relative.ends_with("prune") {
//!         walker.skip_current_dir();
//!     }
//!     seen.push(relative);
//! }
//!
//! assert_eq!(
//!     seen,
//!     [PathBuf::from("keep"), PathBuf::from("keep/inner"), PathBuf::from("prune")]
//! );
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod builder;
mod entry;
mod error;
mod usage;
mod walker;

pub use builder::WalkBuilder;
pub use entry::WalkEntry;
pub use error::WalkError;
pub use usage::{DiskUsage, disk_usage};
pub use walker::Walker;
