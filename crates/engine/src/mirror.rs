//! Copy-tool collaborator.
//!
//! Every content transfer between a backup and its volatile copy goes
//! through [`Mirror`]: make `destination` an attribute-preserving replica of
//! the contents of `source`, deleting destination entries that no longer
//! exist in `source`.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

/// Recursive mirroring of one directory's contents onto another.
pub trait Mirror {
    /// Replicates the contents of `source` into `destination`.
    fn mirror(&self, source: &Path, destination: &Path) -> Result<(), MirrorError>;
}

impl<M: Mirror + ?Sized> Mirror for &M {
    fn mirror(&self, source: &Path, destination: &Path) -> Result<(), MirrorError> {
        (**self).mirror(source, destination)
    }
}

/// Failure of a mirror operation.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The copy tool could not be started.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The copy tool ran and reported failure.
    #[error("'{command}' failed with {status}{}", stderr_suffix(.stderr))]
    Failed {
        /// Rendered command line.
        command: String,
        /// Exit status reported by the tool.
        status: ExitStatus,
        /// Captured standard error, trimmed.
        stderr: String,
    },
    /// An in-process mirror failed on a filesystem operation.
    #[error("failed to mirror '{path}': {source}")]
    Io {
        /// Path being processed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Runs `⟨program⟩ -a --delete ⟨source⟩/ ⟨destination⟩` and waits for it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandMirror {
    program: PathBuf,
}

impl CommandMirror {
    /// Creates a mirror that runs `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The copy tool that is run.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn arguments(source: &Path, destination: &Path) -> [OsString; 4] {
        let mut source_arg = source.as_os_str().to_os_string();
        if !source_arg.as_encoded_bytes().ends_with(b"/") {
            source_arg.push("/");
        }
        [
            OsString::from("-a"),
            OsString::from("--delete"),
            source_arg,
            destination.as_os_str().to_os_string(),
        ]
    }
}

impl Mirror for CommandMirror {
    fn mirror(&self, source: &Path, destination: &Path) -> Result<(), MirrorError> {
        let arguments = Self::arguments(source, destination);
        let output = Command::new(&self.program)
            .args(&arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| MirrorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        Err(MirrorError::Failed {
            command: CommandLine {
                program: &self.program,
                arguments: &arguments,
            }
            .to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }
}

struct CommandLine<'a> {
    program: &'a Path,
    arguments: &'a [OsString],
}

impl fmt::Display for CommandLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for argument in self.arguments {
            write!(f, " {}", argument.to_string_lossy())?;
        }
        Ok(())
    }
}
