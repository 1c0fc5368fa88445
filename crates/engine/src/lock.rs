//! Cross-process exclusion.
//!
//! The lock is a directory: `mkdir` either creates it or fails because it
//! already exists, atomically. Holding the lock means having created
//! `⟨dir⟩/process.lock`; releasing it means removing that directory.

use std::fs::{self, DirBuilder};
use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use logging::{Logger, Severity};
use metadata::{TrustError, ensure_trusted_directory};
use thiserror::Error;

/// Name of the lock directory inside the configured lock location.
pub const LOCK_NAME: &str = "process.lock";

/// Delay between attempts while another process holds the lock.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

const COMPONENT: &str = "lock";

/// Lock failures.
#[derive(Debug, Error)]
pub enum LockError {
    /// The lock location cannot be trusted.
    #[error("refusing lock location: {0}")]
    Untrusted(#[from] TrustError),
    /// Creating the lock failed for a reason other than contention.
    #[error("failed to create lock '{path}': {source}")]
    Acquire {
        /// Lock path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The configured wait expired while another process held the lock.
    #[error("timed out after {waited:?} waiting for lock '{path}'")]
    Timeout {
        /// Lock path.
        path: PathBuf,
        /// Time spent waiting.
        waited: Duration,
    },
    /// The lock could not be removed. Mutual exclusion is no longer
    /// guaranteed for later invocations.
    #[error("failed to release lock '{path}': {source}")]
    Release {
        /// Lock path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl LockError {
    /// Reports whether this is a release failure.
    pub const fn is_integrity_fault(&self) -> bool {
        matches!(self, Self::Release { .. })
    }
}

/// Lock settings for one lock location.
#[derive(Clone, Debug)]
pub struct Lock {
    dir: PathBuf,
    timeout: Option<Duration>,
    poll_interval: Duration,
    logger: Logger,
}

impl Lock {
    /// Creates a lock living in `dir`.
    pub fn new(dir: impl Into<PathBuf>, logger: Logger) -> Self {
        Self {
            dir: dir.into(),
            timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            logger,
        }
    }

    /// Bounds the time [`Lock::acquire`] waits. `None` waits forever.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the delay between attempts.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Path of the lock directory.
    pub fn path(&self) -> PathBuf {
        self.dir.join(LOCK_NAME)
    }

    /// Blocks until the lock is held.
    pub fn acquire(&self) -> Result<LockGuard, LockError> {
        ensure_trusted_directory(&self.dir, rustix::process::geteuid().as_raw())?;

        let path = self.path();
        let started = Instant::now();
        let mut announced = false;
        loop {
            match DirBuilder::new().mode(0o700).create(&path) {
                Ok(()) => {
                    self.logger
                        .debug(COMPONENT, format_args!("acquired '{}'", path.display()));
                    return Ok(LockGuard {
                        path: Some(path),
                        logger: self.logger.clone(),
                    });
                }
                Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
                    let waited = started.elapsed();
                    if self.timeout.is_some_and(|limit| waited >= limit) {
                        return Err(LockError::Timeout { path, waited });
                    }
                    if !announced {
                        self.logger.info(
                            COMPONENT,
                            format_args!("'{}' is held by another process, waiting", path.display()),
                        );
                        announced = true;
                    }
                    thread::sleep(self.poll_interval);
                }
                Err(source) => return Err(LockError::Acquire { path, source }),
            }
        }
    }
}

/// Proof that the lock is held.
///
/// Call [`LockGuard::release`] to surface release failures. A guard dropped
/// without an explicit release still removes the lock and aborts the
/// process if that fails.
#[derive(Debug)]
pub struct LockGuard {
    path: Option<PathBuf>,
    logger: Logger,
}

impl LockGuard {
    /// Path of the held lock.
    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Removes the lock.
    pub fn release(mut self) -> Result<(), LockError> {
        match self.path.take() {
            Some(path) => remove(&path, &self.logger),
            None => Ok(()),
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(error) = remove(&path, &self.logger) {
                self.logger.emit(Severity::Emergency, COMPONENT, &error);
                eprintln!("goanysync: {error}");
                std::process::abort();
            }
        }
    }
}

fn remove(path: &Path, logger: &Logger) -> Result<(), LockError> {
    fs::remove_dir(path).map_err(|source| LockError::Release {
        path: path.to_path_buf(),
        source,
    })?;
    logger.debug(COMPONENT, format_args!("released '{}'", path.display()));
    Ok(())
}
