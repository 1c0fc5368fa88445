//! Read-only probes of the on-disk relocation state.

use std::fs;
use std::path::{Path, PathBuf};

use metadata::Owner;

use crate::layout::Layout;

/// A source found linked to its own volatile path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Relocation {
    pub(crate) owner: Owner,
    pub(crate) volatile: PathBuf,
    pub(crate) backup: PathBuf,
}

/// Target of `path` when it is a symlink.
pub(crate) fn link_target(path: &Path) -> Option<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_symlink() => fs::read_link(path).ok(),
        _ => None,
    }
}

/// Whether `path` is a directory, without following a final symlink.
pub(crate) fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|metadata| metadata.is_dir())
}

/// Whether anything exists at `path`, without following a final symlink.
pub(crate) fn exists_nofollow(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Whether `path` is a symlink whose target does not resolve.
pub(crate) fn is_dangling(path: &Path) -> bool {
    link_target(path).is_some() && fs::metadata(path).is_err()
}

/// Decodes the link at `source` and returns the relocation it encodes when
/// the target is exactly the volatile path of `source` for the owner in the
/// target's owner segment.
pub(crate) fn relocation(layout: &Layout, source: &Path) -> Option<Relocation> {
    let target = link_target(source)?;
    let decoded = layout.decode(&target)?;
    let mapped = layout.map(source, decoded.owner);
    (target == mapped.volatile).then_some(Relocation {
        owner: decoded.owner,
        volatile: mapped.volatile,
        backup: mapped.backup,
    })
}
