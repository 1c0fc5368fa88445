//! `KEY = value` configuration reader.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::{ConfigError, ParseError};

const COMMENT: char = '#';
const SEPARATOR: char = '=';

/// Raw key/value pairs read from a configuration file.
///
/// Keys are case-sensitive. A key appearing twice keeps its last value.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConfigFile {
    entries: BTreeMap<String, String>,
}

impl ConfigFile {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses the file at `path`.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses configuration text.
    ///
    /// Blank lines and lines starting with `#` are skipped. Every other line
    /// must contain `=` with a non-empty key before it; the value is whatever
    /// follows the first `=`, trimmed, and may itself contain `=`.
    ///
    /// ```
    /// use config::ConfigFile;
    ///
    /// let file = ConfigFile::parse("# comment\nTMPFS = /tmp/goanysync\nX = a=b\n").unwrap();
    /// assert_eq!(file.get("TMPFS"), Some("/tmp/goanysync"));
    /// assert_eq!(file.get("X"), Some("a=b"));
    /// ```
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut entries = BTreeMap::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(COMMENT) {
                continue;
            }

            let parse_error = || ParseError {
                line: index + 1,
                content: line.to_owned(),
            };
            let (key, value) = line.split_once(SEPARATOR).ok_or_else(parse_error)?;
            let key = key.trim_end();
            if key.is_empty() {
                return Err(parse_error());
            }
            entries.insert(key.to_owned(), value.trim_start().to_owned());
        }
        Ok(Self { entries })
    }

    /// Returns the value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key is set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
