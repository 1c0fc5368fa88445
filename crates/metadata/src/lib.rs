#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `metadata` gathers the ownership and permission handling goanysync
//! performs on managed directories: validating a candidate source,
//! creating owner-scoped directory chains in volatile storage, keeping the
//! volatile root traversable and vetting security-sensitive locations such
//! as the lock directory.
//!
//! # Invariants
//!
//! - [`create_dir_all_owned`] changes owner and mode only on directories it
//!   created itself. Shared parents keep whatever they had.
//! - [`inspect_source`] never mutates the filesystem.
//!
//! # Examples
//!
//! ```
//! use metadata::{Owner, create_dir_all_owned, inspect_source};
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let source = inspect_source(temp.path())?;
//! let target = temp.path().join("goanysync-0-0/srv/cache");
//!
//! let created = create_dir_all_owned(&target, source.mode(), Owner::current())?;
//! assert_eq!(created.len(), 3);
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod dirs;
mod error;
mod inspect;
mod ownership;

pub use dirs::{
    VOLATILE_ROOT_MODE, create_dir_all_owned, ensure_traversable, ensure_trusted_directory,
    set_mode,
};
pub use error::{InspectError, MetadataError, TrustError};
pub use inspect::{SourceInfo, inspect_source, untraversable_ancestor};
pub use ownership::{Owner, set_owner};
