//! Crash repair.
//!
//! A source relocated by `prepare` whose volatile storage was wiped before
//! `restore` ran (typically a reboot) is left as a dangling symlink next to
//! an intact backup. [`repair_source`] recognises that signature and puts
//! the backup back in place. Anything else is left alone.

use std::fs;
use std::io;
use std::path::Path;

use logging::Logger;

use crate::layout::Layout;
use crate::links::{is_real_dir, link_target};
use crate::{Outcome, SourceError};

const COMPONENT: &str = "check";

/// Repairs `source` when it shows the crash signature.
///
/// The signature is: `source` is a symlink, its target decodes as a
/// volatile path of `source` (any owner), nothing exists at the target,
/// and the backup is a directory. Returns [`Outcome::Untouched`] without
/// touching the filesystem when any part is absent.
pub fn repair_source(
    layout: &Layout,
    source: &Path,
    logger: &Logger,
) -> Result<Outcome, SourceError> {
    repair_with(layout, source, logger, |from, to| fs::rename(from, to))
}

fn repair_with(
    layout: &Layout,
    source: &Path,
    logger: &Logger,
    move_dir: impl FnOnce(&Path, &Path) -> io::Result<()>,
) -> Result<Outcome, SourceError> {
    let Some(target) = link_target(source) else {
        return Ok(Outcome::Untouched);
    };
    let Some(decoded) = layout.decode(&target) else {
        return Ok(Outcome::Untouched);
    };
    let mapped = layout.map(source, decoded.owner);
    if !mapped.pattern.matches(&target) {
        return Ok(Outcome::Untouched);
    }
    match fs::symlink_metadata(&target) {
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Ok(_) => return Ok(Outcome::Untouched),
        Err(error) => return Err(SourceError::io("inspect", &target, error)),
    }
    if !is_real_dir(&mapped.backup) {
        return Ok(Outcome::Untouched);
    }

    logger.notice(
        COMPONENT,
        format_args!(
            "'{}' links to missing '{}', restoring from '{}'",
            source.display(),
            target.display(),
            mapped.backup.display()
        ),
    );

    fs::remove_file(source).map_err(|error| SourceError::io("remove symlink", source, error))?;
    if let Err(error) = move_dir(&mapped.backup, source) {
        if let Err(relink) = std::os::unix::fs::symlink(&target, source) {
            logger.critical(
                COMPONENT,
                format_args!(
                    "'{}' is gone and its backup stays at '{}': {relink}",
                    source.display(),
                    mapped.backup.display()
                ),
            );
        }
        return Err(SourceError::io("restore backup onto", source, error));
    }

    logger.info(COMPONENT, format_args!("repaired '{}'", source.display()));
    Ok(Outcome::Repaired)
}
