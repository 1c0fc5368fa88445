//! Deterministic `KEY = value` renderer.

use std::fs;
use std::path::Path;

use crate::{ConfigError, ConfigFile};

/// Renders every entry as a `KEY = value` line, sorted by key.
pub fn render(file: &ConfigFile) -> String {
    let mut out = String::new();
    for (key, value) in file.iter() {
        out.push_str(key);
        out.push_str(" = ");
        out.push_str(value);
        out.push('\n');
    }
    out
}

/// Writes the rendered configuration to `path`, replacing any existing file.
pub fn write(file: &ConfigFile, path: &Path) -> Result<(), ConfigError> {
    fs::write(path, render(file)).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
