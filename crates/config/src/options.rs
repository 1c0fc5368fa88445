//! Validated runtime options.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use logging::syslog::SyslogFacility;
use metadata::untraversable_ancestor;

use crate::binary::resolve_binary;
use crate::{ConfigError, ConfigFile};

/// Location read when no `-c` option is given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/goanysync.conf";

/// Copy tool used when `RSYNC_BIN` is absent.
pub const DEFAULT_COPY_TOOL: &str = "rsync";

/// Directory holding the process lock when `LOCK_DIR` is absent.
pub const DEFAULT_LOCK_DIR: &str = "/run/goanysync";

/// Recognised configuration keys.
pub mod keys {
    /// Volatile root.
    pub const TMPFS: &str = "TMPFS";
    /// Comma-separated sources.
    pub const WHATTOSYNC: &str = "WHATTOSYNC";
    /// Copy tool name or path.
    pub const RSYNC_BIN: &str = "RSYNC_BIN";
    /// Directory holding the lock.
    pub const LOCK_DIR: &str = "LOCK_DIR";
    /// Seconds to wait for the lock.
    pub const LOCK_TIMEOUT: &str = "LOCK_TIMEOUT";
    /// Syslog facility name.
    pub const SYSLOG_FACILITY: &str = "SYSLOG_FACILITY";

    /// Every key the loader understands.
    pub const ALL: [&str; 6] = [
        TMPFS,
        WHATTOSYNC,
        RSYNC_BIN,
        LOCK_DIR,
        LOCK_TIMEOUT,
        SYSLOG_FACILITY,
    ];
}

/// Fully validated configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Options {
    volatile_root: PathBuf,
    sources: Vec<PathBuf>,
    copy_tool: PathBuf,
    lock_dir: PathBuf,
    lock_timeout: Option<Duration>,
    syslog_facility: SyslogFacility,
    ignored_keys: Vec<String>,
}

impl Options {
    /// Reads and validates the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_file(&ConfigFile::read(path)?)
    }

    /// Validates already parsed key/value pairs.
    pub fn from_file(file: &ConfigFile) -> Result<Self, ConfigError> {
        let volatile_root = parse_volatile_root(file)?;
        let copy_tool = parse_copy_tool(file)?;
        let sources = parse_sources(file, &volatile_root)?;

        let lock_dir = match file.get(keys::LOCK_DIR) {
            Some(value) => absolute_path(keys::LOCK_DIR, value)?,
            None => PathBuf::from(DEFAULT_LOCK_DIR),
        };

        let lock_timeout = file
            .get(keys::LOCK_TIMEOUT)
            .map(parse_timeout)
            .transpose()?
            .flatten();

        let syslog_facility = match file.get(keys::SYSLOG_FACILITY) {
            Some(value) => {
                SyslogFacility::from_name(value).ok_or_else(|| ConfigError::Invalid {
                    key: keys::SYSLOG_FACILITY,
                    value: value.to_owned(),
                    reason: "unknown syslog facility",
                })?
            }
            None => SyslogFacility::default(),
        };

        let ignored_keys = file
            .iter()
            .map(|(key, _)| key)
            .filter(|key| !keys::ALL.contains(key))
            .map(str::to_owned)
            .collect();

        Ok(Self {
            volatile_root,
            sources,
            copy_tool,
            lock_dir,
            lock_timeout,
            syslog_facility,
            ignored_keys,
        })
    }

    /// Volatile root (`TMPFS`).
    pub fn volatile_root(&self) -> &Path {
        &self.volatile_root
    }

    /// Configured sources in configuration order, without duplicates.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Resolved copy-tool executable.
    pub fn copy_tool(&self) -> &Path {
        &self.copy_tool
    }

    /// Directory holding the process lock.
    pub fn lock_dir(&self) -> &Path {
        &self.lock_dir
    }

    /// Maximum time to wait for the lock; `None` waits indefinitely.
    pub const fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout
    }

    /// Syslog facility.
    pub const fn syslog_facility(&self) -> SyslogFacility {
        self.syslog_facility
    }

    /// Keys present in the file that the loader does not understand.
    pub fn ignored_keys(&self) -> &[String] {
        &self.ignored_keys
    }

    /// Renders the resolved options back into key/value form.
    pub fn to_config_file(&self) -> ConfigFile {
        let mut file = ConfigFile::new();
        file.set(keys::TMPFS, self.volatile_root.display().to_string());
        file.set(
            keys::WHATTOSYNC,
            self.sources
                .iter()
                .map(|source| source.display().to_string())
                .collect::<Vec<_>>()
                .join(","),
        );
        file.set(keys::RSYNC_BIN, self.copy_tool.display().to_string());
        file.set(keys::LOCK_DIR, self.lock_dir.display().to_string());
        file.set(
            keys::LOCK_TIMEOUT,
            self.lock_timeout.map_or(0, |t| t.as_secs()).to_string(),
        );
        file.set(keys::SYSLOG_FACILITY, self.syslog_facility.as_str());
        file
    }
}

/// Normalises an absolute path: drops `.` components and trailing slashes.
///
/// Returns `None` for relative paths or paths containing `..`.
pub fn normalize_absolute(value: &str) -> Option<PathBuf> {
    let path = Path::new(value);
    if !path.is_absolute() {
        return None;
    }
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::RootDir => normalized.push(Component::RootDir),
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => return None,
        }
    }
    Some(normalized)
}

fn required<'a>(file: &'a ConfigFile, key: &'static str) -> Result<&'a str, ConfigError> {
    let value = file.get(key).ok_or(ConfigError::Missing { key })?.trim();
    if value.is_empty() {
        return Err(ConfigError::Empty { key });
    }
    Ok(value)
}

fn absolute_path(key: &'static str, value: &str) -> Result<PathBuf, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Empty { key });
    }
    normalize_absolute(value).ok_or_else(|| ConfigError::NotAbsolute {
        key,
        value: value.to_owned(),
    })
}

fn parse_volatile_root(file: &ConfigFile) -> Result<PathBuf, ConfigError> {
    let root = absolute_path(keys::TMPFS, required(file, keys::TMPFS)?)?;
    if let Some(ancestor) = untraversable_ancestor(&root) {
        return Err(ConfigError::Untraversable { ancestor });
    }
    Ok(root)
}

fn parse_copy_tool(file: &ConfigFile) -> Result<PathBuf, ConfigError> {
    let name = file
        .get(keys::RSYNC_BIN)
        .unwrap_or(DEFAULT_COPY_TOOL)
        .trim();
    if name.is_empty() {
        return Err(ConfigError::Empty {
            key: keys::RSYNC_BIN,
        });
    }
    resolve_binary(OsStr::new(name)).ok_or_else(|| ConfigError::CopyTool {
        name: name.to_owned(),
    })
}

fn parse_sources(file: &ConfigFile, root: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let raw = required(file, keys::WHATTOSYNC)?;
    let mut sources: Vec<PathBuf> = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let source = absolute_path(keys::WHATTOSYNC, entry)?;
        if source.parent().is_none() {
            return Err(ConfigError::Invalid {
                key: keys::WHATTOSYNC,
                value: entry.to_owned(),
                reason: "the filesystem root cannot be relocated",
            });
        }
        if source.starts_with(root) || root.starts_with(&source) {
            return Err(ConfigError::SourceOverlapsRoot {
                source_path: source,
                root: root.to_path_buf(),
            });
        }
        if !sources.contains(&source) {
            sources.push(source);
        }
    }
    if sources.is_empty() {
        return Err(ConfigError::Empty {
            key: keys::WHATTOSYNC,
        });
    }
    Ok(sources)
}

fn parse_timeout(value: &str) -> Result<Option<Duration>, ConfigError> {
    let seconds: u64 = value.trim().parse().map_err(|_| ConfigError::Invalid {
        key: keys::LOCK_TIMEOUT,
        value: value.to_owned(),
        reason: "expected a whole number of seconds",
    })?;
    Ok((seconds > 0).then(|| Duration::from_secs(seconds)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_dots_and_trailing_slashes() {
        assert_eq!(
            normalize_absolute("/home/./u/Projects/"),
            Some(PathBuf::from("/home/u/Projects"))
        );
        assert_eq!(normalize_absolute("//srv//cache"), Some(PathBuf::from("/srv/cache")));
        assert_eq!(normalize_absolute("relative/path"), None);
        assert_eq!(normalize_absolute("/srv/../etc"), None);
    }

    #[test]
    fn timeout_zero_means_unbounded() {
        assert_eq!(parse_timeout("0").expect("parse"), None);
        assert_eq!(
            parse_timeout(" 15 ").expect("parse"),
            Some(Duration::from_secs(15))
        );
        assert!(matches!(
            parse_timeout("soon"),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn required_distinguishes_missing_and_empty() {
        let mut file = ConfigFile::new();
        assert!(matches!(
            required(&file, keys::TMPFS),
            Err(ConfigError::Missing { key: "TMPFS" })
        ));
        file.set(keys::TMPFS, "   ");
        assert!(matches!(
            required(&file, keys::TMPFS),
            Err(ConfigError::Empty { key: "TMPFS" })
        ));
    }

    #[test]
    fn sources_are_trimmed_deduplicated_and_ordered() {
        let mut file = ConfigFile::new();
        file.set(keys::WHATTOSYNC, " /srv/b , ,/srv/a,/srv/b/ ,");
        let sources = parse_sources(&file, Path::new("/tmp/volatile")).expect("sources");
        assert_eq!(sources, vec![PathBuf::from("/srv/b"), PathBuf::from("/srv/a")]);
    }

    #[test]
    fn sources_may_not_overlap_the_volatile_root() {
        let mut file = ConfigFile::new();
        file.set(keys::WHATTOSYNC, "/tmp/volatile/inner");
        assert!(matches!(
            parse_sources(&file, Path::new("/tmp/volatile")),
            Err(ConfigError::SourceOverlapsRoot { .. })
        ));

        file.set(keys::WHATTOSYNC, "/tmp");
        assert!(matches!(
            parse_sources(&file, Path::new("/tmp/volatile")),
            Err(ConfigError::SourceOverlapsRoot { .. })
        ));

        file.set(keys::WHATTOSYNC, "/tmp/volatile-data");
        assert!(parse_sources(&file, Path::new("/tmp/volatile")).is_ok());
    }

    #[test]
    fn sources_reject_relative_and_root_entries() {
        let mut file = ConfigFile::new();
        file.set(keys::WHATTOSYNC, "/srv/a,relative");
        assert!(matches!(
            parse_sources(&file, Path::new("/tmp/v")),
            Err(ConfigError::NotAbsolute { .. })
        ));

        file.set(keys::WHATTOSYNC, "/");
        assert!(matches!(
            parse_sources(&file, Path::new("/tmp/v")),
            Err(ConfigError::Invalid { .. })
        ));

        file.set(keys::WHATTOSYNC, " , ");
        assert!(matches!(
            parse_sources(&file, Path::new("/tmp/v")),
            Err(ConfigError::Empty { .. })
        ));
    }
}
