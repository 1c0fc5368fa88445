//! Detection of volatile directories no configured source accounts for.

use std::fmt;
use std::path::{Path, PathBuf};

use logging::Logger;
use metadata::Owner;
use walk::{WalkBuilder, WalkError};

use crate::layout::{Layout, backup_path};
use crate::links::{is_dangling, is_real_dir, link_target};

const COMPONENT: &str = "orphans";

/// A volatile directory whose implied source is not configured.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Orphan {
    /// Directory found in volatile storage.
    pub volatile_path: PathBuf,
    /// Source path it decodes to.
    pub source: PathBuf,
    /// Owner segment it lives under.
    pub owner: Owner,
    /// The implied source still has a backup or links into volatile
    /// storage, so it was relocated once and then dropped from the
    /// configuration.
    pub linked: bool,
}

impl fmt::Display for Orphan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (source {}, owner {})",
            self.volatile_path.display(),
            self.source.display(),
            self.owner
        )?;
        if self.linked {
            f.write_str(" [linked]")?;
        }
        Ok(())
    }
}

/// Result of an orphan scan.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrphanReport {
    orphans: Vec<Orphan>,
}

impl OrphanReport {
    /// `true` when nothing was found.
    pub fn is_clean(&self) -> bool {
        self.orphans.is_empty()
    }

    /// Number of orphans.
    pub fn len(&self) -> usize {
        self.orphans.len()
    }

    /// Same as [`OrphanReport::is_clean`].
    pub fn is_empty(&self) -> bool {
        self.orphans.is_empty()
    }

    /// Every orphan, in walk order.
    pub fn orphans(&self) -> &[Orphan] {
        &self.orphans
    }

    /// The orphans whose implied source is still linked.
    pub fn linked(&self) -> impl Iterator<Item = &Orphan> {
        self.orphans.iter().filter(|orphan| orphan.linked)
    }
}

/// Walks the volatile root and reports directories whose decoded source is
/// neither a configured source, inside one, nor an ancestor of one.
///
/// Entries directly under the root that are not owner segments are skipped.
/// An orphan's own subtree is not descended into. Nothing is modified.
pub fn scan(layout: &Layout, sources: &[PathBuf], logger: &Logger) -> Result<OrphanReport, WalkError> {
    let mut report = OrphanReport::default();

    let mut walker = match WalkBuilder::new(layout.root()).include_root(false).build() {
        Ok(walker) => walker,
        Err(error) if error.is_not_found() => {
            logger.debug(
                COMPONENT,
                format_args!("'{}' does not exist, nothing to scan", layout.root().display()),
            );
            return Ok(report);
        }
        Err(error) => return Err(error),
    };

    while let Some(entry) = walker.next() {
        let entry = entry?;
        if !entry.is_dir() {
            continue;
        }
        let Some(decoded) = layout.decode(entry.full_path()) else {
            walker.skip_current_dir();
            continue;
        };
        if decoded.source == Path::new("/") {
            continue;
        }

        if sources.iter().any(|source| decoded.source.starts_with(source)) {
            walker.skip_current_dir();
            continue;
        }
        if sources.iter().any(|source| source.starts_with(&decoded.source)) {
            continue;
        }

        walker.skip_current_dir();
        let linked = is_linked(layout, &decoded.source);
        let orphan = Orphan {
            volatile_path: entry.full_path().to_path_buf(),
            source: decoded.source,
            owner: decoded.owner,
            linked,
        };
        if linked {
            logger.warning(
                COMPONENT,
                format_args!(
                    "'{}' is orphaned and '{}' still refers to it, restore it manually",
                    orphan.volatile_path.display(),
                    orphan.source.display()
                ),
            );
        } else {
            logger.warning(
                COMPONENT,
                format_args!("'{}' is orphaned", orphan.volatile_path.display()),
            );
        }
        report.orphans.push(orphan);
    }

    Ok(report)
}

fn is_linked(layout: &Layout, source: &Path) -> bool {
    if is_real_dir(&backup_path(source)) {
        return true;
    }
    match link_target(source) {
        Some(target) => layout.is_volatile(&target) || is_dangling(source),
        None => false,
    }
}
