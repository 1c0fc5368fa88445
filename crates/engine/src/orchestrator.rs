//! The verbs.
//!
//! Every per-source verb walks the configured sources in order and keeps
//! going past failures; a failed source is logged and recorded as
//! [`Outcome::Skipped`]. Only conditions that make the whole run pointless
//! surface as [`EngineError`].

use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use logging::Logger;
use metadata::{create_dir_all_owned, ensure_traversable, inspect_source};

use crate::layout::{Layout, MappedPaths};
use crate::links::{exists_nofollow, is_real_dir, link_target, relocation};
use crate::mirror::Mirror;
use crate::orphans::{self, OrphanReport};
use crate::repair::repair_source;
use crate::status::{self, StatusReport};
use crate::{EngineError, Outcome, SourceError, Verb, VerbReport};

/// Runs the verbs over a fixed set of sources.
#[derive(Debug)]
pub struct Orchestrator<M> {
    layout: Layout,
    sources: Vec<PathBuf>,
    mirror: M,
    logger: Logger,
}

impl<M: Mirror> Orchestrator<M> {
    /// Creates an orchestrator for `sources` under `layout`.
    pub fn new(layout: Layout, sources: Vec<PathBuf>, mirror: M, logger: Logger) -> Self {
        Self {
            layout,
            sources,
            mirror,
            logger,
        }
    }

    /// The path layout in use.
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The configured sources.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Repairs every source showing the crash signature.
    pub fn check(&self) -> VerbReport {
        self.each(Verb::Check, |source| {
            repair_source(&self.layout, source, &self.logger)
        })
    }

    /// Relocates every source onto volatile storage.
    pub fn prepare(&self) -> Result<VerbReport, EngineError> {
        self.ensure_volatile_root()?;
        Ok(self.each(Verb::Prepare, |source| self.prepare_source(source)))
    }

    /// Writes every relocated source's volatile copy back to its backup.
    pub fn flush(&self) -> VerbReport {
        self.each(Verb::Flush, |source| self.flush_source(source))
    }

    /// Puts every relocated source back in place. With `reclaim`, the
    /// volatile copies are deleted as well.
    pub fn restore(&self, reclaim: bool) -> VerbReport {
        self.each(Verb::Restore, |source| self.restore_source(source, reclaim))
    }

    /// Orphan guard, then `check`, then `prepare`.
    pub fn start(&self) -> Result<Vec<VerbReport>, EngineError> {
        let report = self.orphans()?;
        if !report.is_clean() {
            return Err(EngineError::OrphansFound { report });
        }
        let check = self.check();
        let prepare = self.prepare()?;
        Ok(vec![check, prepare])
    }

    /// `flush`, then `restore` with reclaim, then an orphan scan.
    ///
    /// Only sources whose flush succeeded are restored. A relocated source
    /// whose flush failed keeps its link and volatile copy, and the run
    /// fails with [`EngineError::Unflushed`]. Orphans left behind fail the
    /// run as well.
    pub fn stop(&self) -> Result<Vec<VerbReport>, EngineError> {
        let flush = self.flush();
        let restore = self.each(Verb::Restore, |source| match flush.outcome(source) {
            Some(Outcome::Flushed) => self.restore_source(source, true),
            _ if relocation(&self.layout, source).is_some() => Err(SourceError::Unflushed {
                path: source.to_path_buf(),
            }),
            _ => self.restore_source(source, false),
        });

        let unflushed: Vec<PathBuf> = restore
            .entries()
            .iter()
            .filter(|entry| {
                matches!(entry.outcome, Outcome::Skipped(SourceError::Unflushed { .. }))
            })
            .map(|entry| entry.source.clone())
            .collect();
        let report = self.orphans()?;
        if !unflushed.is_empty() {
            return Err(EngineError::Unflushed { sources: unflushed });
        }
        if !report.is_clean() {
            return Err(EngineError::OrphansLeft { report });
        }
        Ok(vec![flush, restore])
    }

    /// Scans volatile storage for orphans.
    pub fn orphans(&self) -> Result<OrphanReport, EngineError> {
        Ok(orphans::scan(&self.layout, &self.sources, &self.logger)?)
    }

    /// Collects the `info` view.
    pub fn status(&self) -> Result<StatusReport, EngineError> {
        status::collect(&self.layout, &self.sources, &self.logger)
    }

    fn each(
        &self,
        verb: Verb,
        mut apply: impl FnMut(&Path) -> Result<Outcome, SourceError>,
    ) -> VerbReport {
        let mut report = VerbReport::new(verb);
        for source in &self.sources {
            let outcome = match apply(source) {
                Ok(outcome) => {
                    self.logger.debug(
                        verb.as_str(),
                        format_args!("'{}': {outcome}", source.display()),
                    );
                    outcome
                }
                Err(error) => {
                    self.logger.warning(
                        verb.as_str(),
                        format_args!("skipping '{}': {error}", source.display()),
                    );
                    Outcome::Skipped(error)
                }
            };
            report.push(source, outcome);
        }
        report
    }

    fn ensure_volatile_root(&self) -> Result<(), EngineError> {
        let root = self.layout.root();
        if ensure_traversable(root).map_err(EngineError::VolatileRoot)? {
            self.logger.notice(
                Verb::Prepare.as_str(),
                format_args!("created volatile root '{}'", root.display()),
            );
        }
        Ok(())
    }

    fn prepare_source(&self, source: &Path) -> Result<Outcome, SourceError> {
        self.prepare_with(source, |target, link| symlink(target, link))
    }

    /// `prepare` for one source, creating the link with `link`.
    fn prepare_with(
        &self,
        source: &Path,
        link: impl FnOnce(&Path, &Path) -> io::Result<()>,
    ) -> Result<Outcome, SourceError> {
        if let Some(target) = link_target(source) {
            return self.prepared_link(source, target);
        }

        let info = inspect_source(source)?;
        let mapped = self.layout.map(source, info.owner());
        if exists_nofollow(&mapped.backup) {
            return Err(SourceError::BackupExists {
                backup: mapped.backup,
            });
        }

        let created = create_dir_all_owned(&mapped.volatile, info.mode(), info.owner())?;
        for dir in &created {
            self.logger.debug(
                Verb::Prepare.as_str(),
                format_args!("created '{}'", dir.display()),
            );
        }

        fs::rename(source, &mapped.backup)
            .map_err(|error| SourceError::io("move aside", source, error))?;
        if let Err(error) = link(&mapped.volatile, source) {
            self.roll_back(source, &mapped, false);
            return Err(SourceError::io("create symlink", source, error));
        }
        if let Err(error) = self.mirror.mirror(&mapped.backup, &mapped.volatile) {
            self.roll_back(source, &mapped, true);
            return Err(error.into());
        }

        self.logger.info(
            Verb::Prepare.as_str(),
            format_args!(
                "'{}' relocated to '{}'",
                source.display(),
                mapped.volatile.display()
            ),
        );
        Ok(Outcome::Prepared)
    }

    /// A source that is already a symlink is prepared only when it links to
    /// its own volatile copy, which must exist and belong to the owner named
    /// in the link, and its backup is still in place.
    fn prepared_link(&self, source: &Path, target: PathBuf) -> Result<Outcome, SourceError> {
        let Some(found) = relocation(&self.layout, source) else {
            return Err(SourceError::ForeignLink {
                path: source.to_path_buf(),
                target,
            });
        };
        if !is_real_dir(&found.volatile) {
            return Err(SourceError::VolatileMissing {
                volatile: found.volatile,
            });
        }
        if !is_real_dir(&found.backup) {
            return Err(SourceError::BackupMissing {
                backup: found.backup,
            });
        }
        let info = inspect_source(source)?;
        if info.owner() != found.owner {
            return Err(SourceError::ForeignLink {
                path: source.to_path_buf(),
                target,
            });
        }
        Ok(Outcome::AlreadyPrepared)
    }

    fn roll_back(&self, source: &Path, mapped: &MappedPaths, linked: bool) {
        if linked {
            if let Err(error) = fs::remove_file(source) {
                self.logger.critical(
                    Verb::Prepare.as_str(),
                    format_args!(
                        "cannot remove '{}' to roll back, data remains in '{}': {error}",
                        source.display(),
                        mapped.backup.display()
                    ),
                );
                return;
            }
        }
        match fs::rename(&mapped.backup, source) {
            Ok(()) => self.logger.notice(
                Verb::Prepare.as_str(),
                format_args!("rolled back '{}'", source.display()),
            ),
            Err(error) => self.logger.critical(
                Verb::Prepare.as_str(),
                format_args!(
                    "cannot move '{}' back to '{}': {error}",
                    mapped.backup.display(),
                    source.display()
                ),
            ),
        }
    }

    fn relocated(&self, source: &Path) -> Result<crate::links::Relocation, SourceError> {
        let found = relocation(&self.layout, source).ok_or_else(|| SourceError::NotRelocated {
            path: source.to_path_buf(),
        })?;
        if !is_real_dir(&found.backup) {
            return Err(SourceError::BackupMissing {
                backup: found.backup,
            });
        }
        Ok(found)
    }

    fn flush_source(&self, source: &Path) -> Result<Outcome, SourceError> {
        let found = self.relocated(source)?;
        if !is_real_dir(&found.volatile) {
            return Err(SourceError::VolatileMissing {
                volatile: found.volatile,
            });
        }
        self.mirror.mirror(&found.volatile, &found.backup)?;
        self.logger.info(
            Verb::Flush.as_str(),
            format_args!(
                "'{}' written back to '{}'",
                found.volatile.display(),
                found.backup.display()
            ),
        );
        Ok(Outcome::Flushed)
    }

    fn restore_source(&self, source: &Path, reclaim: bool) -> Result<Outcome, SourceError> {
        self.restore_with(source, reclaim, |from, to| fs::rename(from, to))
    }

    /// `restore` for one source, moving the backup into place with `move_dir`.
    fn restore_with(
        &self,
        source: &Path,
        reclaim: bool,
        move_dir: impl FnOnce(&Path, &Path) -> io::Result<()>,
    ) -> Result<Outcome, SourceError> {
        let found = self.relocated(source)?;

        fs::remove_file(source).map_err(|error| SourceError::io("remove symlink", source, error))?;
        if let Err(error) = move_dir(&found.backup, source) {
            if let Err(relink) = symlink(&found.volatile, source) {
                self.logger.critical(
                    Verb::Restore.as_str(),
                    format_args!(
                        "'{}' is gone and its data stays in '{}': {relink}",
                        source.display(),
                        found.backup.display()
                    ),
                );
            }
            return Err(SourceError::io("move backup onto", source, error));
        }
        self.logger.info(
            Verb::Restore.as_str(),
            format_args!("'{}' restored", source.display()),
        );

        if reclaim {
            self.reclaim(&found.volatile);
        }
        Ok(Outcome::Restored)
    }

    /// Deletes a volatile copy and every ancestor left empty, stopping
    /// below the volatile root.
    fn reclaim(&self, volatile: &Path) {
        match fs::remove_dir_all(volatile) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => {
                self.logger.warning(
                    Verb::Restore.as_str(),
                    format_args!("cannot reclaim '{}': {error}", volatile.display()),
                );
                return;
            }
        }

        let root = self.layout.root();
        let mut cursor = volatile.parent();
        while let Some(dir) = cursor {
            if dir == root || !dir.starts_with(root) {
                break;
            }
            if fs::remove_dir(dir).is_err() {
                break;
            }
            self.logger.debug(
                Verb::Restore.as_str(),
                format_args!("removed empty '{}'", dir.display()),
            );
            cursor = dir.parent();
        }
    }
}
