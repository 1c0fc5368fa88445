//! Read-only status view behind `info`.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use logging::Logger;
use metadata::{Owner, inspect_source};
use walk::disk_usage;

use crate::layout::{Layout, backup_path};
use crate::links::{exists_nofollow, is_dangling, is_real_dir, relocation};
use crate::orphans::{self, OrphanReport};
use crate::EngineError;

const COMPONENT: &str = "status";

/// State of one configured source.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceStatus {
    /// The configured source.
    pub source: PathBuf,
    /// Owner, when it could be determined.
    pub owner: Option<Owner>,
    /// Where the volatile copy lives (or would live) for that owner.
    pub volatile_path: Option<PathBuf>,
    /// The source links to its own volatile path.
    pub relocated: bool,
    /// The source is a symlink whose target is missing.
    pub dangling: bool,
    /// Allocated bytes of the volatile copy.
    pub volatile_usage: Option<u64>,
    /// The backup directory exists.
    pub backup_exists: bool,
}

/// Size of the filesystem holding the volatile root.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capacity {
    /// Total size in bytes.
    pub total_bytes: u64,
    /// Free bytes.
    pub free_bytes: u64,
    /// Bytes available to unprivileged users.
    pub available_bytes: u64,
}

impl Capacity {
    /// Reads capacity figures for the filesystem holding `path`.
    pub fn of(path: &Path) -> io::Result<Self> {
        let stat = rustix::fs::statvfs(path)?;
        Ok(Self {
            total_bytes: stat.f_blocks.saturating_mul(stat.f_frsize),
            free_bytes: stat.f_bfree.saturating_mul(stat.f_frsize),
            available_bytes: stat.f_bavail.saturating_mul(stat.f_frsize),
        })
    }
}

/// Everything `info` shows.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusReport {
    /// The volatile root.
    pub volatile_root: PathBuf,
    /// One row per configured source, in configuration order.
    pub sources: Vec<SourceStatus>,
    /// Sum of the volatile copies' usage.
    pub total_usage: u64,
    /// Capacity of the volatile filesystem, when the root exists.
    pub capacity: Option<Capacity>,
    /// Orphan scan result.
    pub orphans: OrphanReport,
}

/// Collects the status of every source plus an orphan scan.
pub fn collect(
    layout: &Layout,
    sources: &[PathBuf],
    logger: &Logger,
) -> Result<StatusReport, EngineError> {
    let rows: Vec<SourceStatus> = sources
        .iter()
        .map(|source| source_status(layout, source, logger))
        .collect();
    let total_usage = rows.iter().filter_map(|row| row.volatile_usage).sum();

    let capacity = if is_real_dir(layout.root()) {
        match Capacity::of(layout.root()) {
            Ok(capacity) => Some(capacity),
            Err(error) => {
                logger.warning(
                    COMPONENT,
                    format_args!("cannot read capacity of '{}': {error}", layout.root().display()),
                );
                None
            }
        }
    } else {
        None
    };

    Ok(StatusReport {
        volatile_root: layout.root().to_path_buf(),
        sources: rows,
        total_usage,
        capacity,
        orphans: orphans::scan(layout, sources, logger)?,
    })
}

fn source_status(layout: &Layout, source: &Path, logger: &Logger) -> SourceStatus {
    let backup_exists = exists_nofollow(&backup_path(source));
    let dangling = is_dangling(source);

    if let Some(found) = relocation(layout, source) {
        let volatile_usage = if is_real_dir(&found.volatile) {
            match disk_usage(&found.volatile) {
                Ok(usage) => Some(usage.allocated_bytes),
                Err(error) => {
                    logger.warning(COMPONENT, &error);
                    None
                }
            }
        } else {
            None
        };
        return SourceStatus {
            source: source.to_path_buf(),
            owner: Some(found.owner),
            volatile_path: Some(found.volatile),
            relocated: true,
            dangling,
            volatile_usage,
            backup_exists,
        };
    }

    let owner = inspect_source(source).ok().map(|info| info.owner());
    SourceStatus {
        source: source.to_path_buf(),
        owner,
        volatile_path: owner.map(|owner| layout.volatile_path(source, owner)),
        relocated: false,
        dangling,
        volatile_usage: None,
        backup_exists,
    }
}

/// Renders a byte count with a binary unit.
///
/// ```
/// use engine::status::human_bytes;
///
/// assert_eq!(human_bytes(512), "512 B");
/// assert_eq!(human_bytes(1536), "1.5 KiB");
/// assert_eq!(human_bytes(3 * 1024 * 1024 * 1024), "3.0 GiB");
/// ```
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.1} {unit}")
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "volatile root: {}", self.volatile_root.display())?;
        for row in &self.sources {
            writeln!(f)?;
            writeln!(f, "{}", row.source.display())?;
            let owner = row
                .owner
                .map_or_else(|| "unknown".to_owned(), |owner| owner.to_string());
            writeln!(f, "  {:<10} {owner}", "owner:")?;
            if let Some(volatile) = &row.volatile_path {
                writeln!(f, "  {:<10} {}", "volatile:", volatile.display())?;
            }
            let state = if row.relocated {
                "relocated"
            } else if row.dangling {
                "dangling link"
            } else {
                "in place"
            };
            writeln!(f, "  {:<10} {state}", "state:")?;
            if let Some(usage) = row.volatile_usage {
                writeln!(f, "  {:<10} {}", "usage:", human_bytes(usage))?;
            }
            writeln!(f, "  {:<10} {}", "backup:", yes_no(row.backup_exists))?;
        }
        writeln!(f)?;
        writeln!(f, "total volatile usage: {}", human_bytes(self.total_usage))?;
        if let Some(capacity) = self.capacity {
            writeln!(
                f,
                "volatile filesystem: {} total, {} free, {} available",
                human_bytes(capacity.total_bytes),
                human_bytes(capacity.free_bytes),
                human_bytes(capacity.available_bytes)
            )?;
        }
        if self.orphans.is_clean() {
            writeln!(f, "orphans: none")?;
        } else {
            writeln!(f, "orphans:")?;
            for orphan in self.orphans.orphans() {
                writeln!(f, "  {orphan}")?;
            }
        }
        Ok(())
    }
}
