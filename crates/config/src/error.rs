use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A line of the configuration file could not be parsed.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("line {line}: could not parse '{content}'")]
pub struct ParseError {
    /// One-based line number.
    pub line: usize,
    /// The offending line, trimmed.
    pub content: String,
}

/// Failure while loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("failed to access configuration '{path}': {source}")]
    Io {
        /// Configuration file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The file is not valid `KEY = value` syntax.
    #[error("configuration '{path}' {source}")]
    Parse {
        /// Configuration file path.
        path: PathBuf,
        /// Which line failed.
        #[source]
        source: ParseError,
    },
    /// A required key is absent.
    #[error("no {key} defined")]
    Missing {
        /// Missing key.
        key: &'static str,
    },
    /// A key is present with an empty value.
    #[error("empty {key} value defined")]
    Empty {
        /// Offending key.
        key: &'static str,
    },
    /// A path option is not absolute or contains `..`.
    #[error("{key} path '{value}' must be absolute and free of '..' components")]
    NotAbsolute {
        /// Offending key.
        key: &'static str,
        /// Value as written.
        value: String,
    },
    /// An existing ancestor of the volatile root cannot be traversed by all
    /// users.
    #[error("TMPFS parent '{ancestor}' does not have the execute bit set for all users")]
    Untraversable {
        /// The ancestor lacking execute bits.
        ancestor: PathBuf,
    },
    /// A source overlaps the volatile root.
    #[error("source '{source_path}' overlaps the TMPFS root '{root}'")]
    SourceOverlapsRoot {
        /// Offending source.
        source_path: PathBuf,
        /// Volatile root.
        root: PathBuf,
    },
    /// The copy tool could not be found or is not executable.
    #[error("copy tool '{name}' is not available on PATH or is not executable")]
    CopyTool {
        /// Name or path as configured.
        name: String,
    },
    /// A value failed validation for another reason.
    #[error("invalid {key} value '{value}': {reason}")]
    Invalid {
        /// Offending key.
        key: &'static str,
        /// Value as written.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}
