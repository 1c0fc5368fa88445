use crate::{WalkBuilder, WalkError};
use std::collections::HashSet;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

/// Size of the unit `st_blocks` is counted in.
const BLOCK_SIZE: u64 = 512;

/// Totals gathered by [`disk_usage`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DiskUsage {
    /// Bytes allocated on disk, the way `du` counts them.
    pub allocated_bytes: u64,
    /// Sum of apparent file sizes.
    pub apparent_bytes: u64,
    /// Number of entries visited, the root included.
    pub entries: u64,
}

/// Sums the allocated blocks below `root` without following symlinks.
///
/// Files with several hard links inside the tree are counted once.
pub fn disk_usage(root: &Path) -> Result<DiskUsage, WalkError> {
    let mut usage = DiskUsage::default();
    let mut seen = HashSet::new();

    for entry in WalkBuilder::new(root).build()? {
        let entry = entry?;
        let metadata = entry.metadata();
        if metadata.nlink() > 1 && !metadata.is_dir() && !seen.insert((metadata.dev(), metadata.ino())) {
            continue;
        }
        usage.entries += 1;
        usage.allocated_bytes += metadata.blocks() * BLOCK_SIZE;
        usage.apparent_bytes += metadata.len();
    }

    Ok(usage)
}
