use std::fmt;
use std::path::{Path, PathBuf};

use crate::SourceError;

/// The per-source transitions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Verb {
    /// Crash repair.
    Check,
    /// Relocation onto volatile storage.
    Prepare,
    /// Volatile copy written back to the backup.
    Flush,
    /// Source put back in place.
    Restore,
}

impl Verb {
    /// Lowercase name, also used as the log component.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Prepare => "prepare",
            Self::Flush => "flush",
            Self::Restore => "restore",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a verb did to one source.
#[derive(Debug)]
pub enum Outcome {
    /// Relocated onto volatile storage.
    Prepared,
    /// Already relocated; nothing changed.
    AlreadyPrepared,
    /// Backup refreshed from the volatile copy.
    Flushed,
    /// Back in place as a real directory.
    Restored,
    /// Crash signature found and undone.
    Repaired,
    /// Nothing to do.
    Untouched,
    /// Left alone because of an error.
    Skipped(SourceError),
}

impl Outcome {
    /// Reports whether the source was skipped.
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prepared => f.write_str("prepared"),
            Self::AlreadyPrepared => f.write_str("already prepared"),
            Self::Flushed => f.write_str("flushed"),
            Self::Restored => f.write_str("restored"),
            Self::Repaired => f.write_str("repaired"),
            Self::Untouched => f.write_str("untouched"),
            Self::Skipped(error) => write!(f, "skipped: {error}"),
        }
    }
}

/// One source's line in a [`VerbReport`].
#[derive(Debug)]
pub struct SourceReport {
    /// The configured source.
    pub source: PathBuf,
    /// What happened to it.
    pub outcome: Outcome,
}

/// Result of running one verb over every configured source.
#[derive(Debug)]
pub struct VerbReport {
    verb: Verb,
    entries: Vec<SourceReport>,
}

impl VerbReport {
    pub(crate) const fn new(verb: Verb) -> Self {
        Self {
            verb,
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, source: &Path, outcome: Outcome) {
        self.entries.push(SourceReport {
            source: source.to_path_buf(),
            outcome,
        });
    }

    /// The verb that ran.
    pub const fn verb(&self) -> Verb {
        self.verb
    }

    /// Every source in configuration order.
    pub fn entries(&self) -> &[SourceReport] {
        &self.entries
    }

    /// Outcome recorded for `source`.
    pub fn outcome(&self, source: &Path) -> Option<&Outcome> {
        self.entries
            .iter()
            .find(|entry| entry.source == source)
            .map(|entry| &entry.outcome)
    }

    /// Sources the verb skipped.
    pub fn skipped(&self) -> impl Iterator<Item = &SourceReport> {
        self.entries.iter().filter(|entry| entry.outcome.is_skipped())
    }

    /// Sources a `check` repaired.
    pub fn repaired(&self) -> Vec<&Path> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.outcome, Outcome::Repaired))
            .map(|entry| entry.source.as_path())
            .collect()
    }
}

impl fmt::Display for VerbReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(
                f,
                "{}: {}: {}",
                self.verb,
                entry.source.display(),
                entry.outcome
            )?;
        }
        Ok(())
    }
}
