#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `config` reads the goanysync configuration file, validates it into
//! [`Options`] and renders resolved options back to text for verbose
//! output.
//!
//! The file format is one `KEY = value` per line. `#` starts a comment line,
//! blank lines are ignored and a later duplicate key overrides an earlier
//! one.
//!
//! # Errors
//!
//! Every failure is a [`ConfigError`]; the command-line front-end maps the
//! whole class to a single exit status.
//!
//! # Examples
//!
//! ```
//! use config::{ConfigFile, writer};
//!
//! let file = ConfigFile::parse("WHATTOSYNC = /srv/a\nTMPFS = /tmp/goanysync\n").unwrap();
//! assert_eq!(
//!     writer::render(&file),
//!     "TMPFS = /tmp/goanysync\nWHATTOSYNC = /srv/a\n"
//! );
//! ```

mod binary;
mod error;
mod options;
mod reader;
pub mod writer;

pub use binary::{binary_candidates, is_executable, resolve_binary};
pub use error::{ConfigError, ParseError};
pub use options::{
    DEFAULT_CONFIG_PATH, DEFAULT_COPY_TOOL, DEFAULT_LOCK_DIR, Options, keys, normalize_absolute,
};
pub use reader::ConfigFile;
