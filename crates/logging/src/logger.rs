//! crates/logging/src/logger.rs
//! The injectable logging capability handed to every engine component.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::Severity;
use crate::syslog::{SyslogConfig, SyslogGuard, syslog_message};

/// Default threshold for the console backend.
pub const DEFAULT_CONSOLE_THRESHOLD: Severity = Severity::Warning;

/// Default threshold for the syslog backend.
pub const DEFAULT_SYSLOG_THRESHOLD: Severity = Severity::Info;

/// One emitted log record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    /// Severity of the record.
    pub severity: Severity,
    /// Component that produced it (`lock`, `prepare`, `orphans`, ...).
    pub component: &'static str,
    /// Rendered message text.
    pub message: String,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.severity.label(),
            self.component,
            self.message
        )
    }
}

#[derive(Debug)]
struct SyslogBackend {
    threshold: Severity,
    _guard: SyslogGuard,
}

#[derive(Debug)]
struct Inner {
    console: Option<Severity>,
    syslog: Option<SyslogBackend>,
    capture: Option<Mutex<Vec<Record>>>,
}

/// Cheaply cloneable logging handle.
///
/// A `Logger` routes each record to up to three backends:
///
/// - the console, as a `tracing` event with target `goanysync` and a
///   `component` field, when the record passes the console threshold;
/// - syslog(3), when a syslog backend is attached and the record passes its
///   threshold;
/// - an in-memory capture buffer, which keeps every record regardless of
///   severity and exists so tests can assert on what was logged.
///
/// # Examples
///
/// ```
/// use logging::{Logger, Severity};
///
/// let logger = Logger::capturing();
/// logger.warning("prepare", format_args!("skipping {}", "/srv/cache"));
///
/// let records = logger.records();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].severity, Severity::Warning);
/// assert_eq!(records[0].message, "skipping /srv/cache");
/// ```
#[derive(Clone, Debug)]
pub struct Logger {
    inner: Arc<Inner>,
}

impl Logger {
    /// Returns a builder with the console backend at its default threshold.
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// Logger that only records into memory.
    pub fn capturing() -> Self {
        Self {
            inner: Arc::new(Inner {
                console: None,
                syslog: None,
                capture: Some(Mutex::new(Vec::new())),
            }),
        }
    }

    /// Logger that discards everything.
    pub fn silent() -> Self {
        Self {
            inner: Arc::new(Inner {
                console: None,
                syslog: None,
                capture: None,
            }),
        }
    }

    /// Emits a record.
    pub fn emit(&self, severity: Severity, component: &'static str, message: impl fmt::Display) {
        let inner = &*self.inner;
        let console = inner.console.is_some_and(|t| severity.passes(t));
        let syslog = inner
            .syslog
            .as_ref()
            .filter(|backend| severity.passes(backend.threshold));
        if !console && syslog.is_none() && inner.capture.is_none() {
            return;
        }

        let text = message.to_string();
        if console {
            forward_to_tracing(severity, component, &text);
        }
        if syslog.is_some() {
            syslog_message(severity, &format!("{component}: {text}"));
        }
        if let Some(capture) = &inner.capture {
            capture
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(Record {
                    severity,
                    component,
                    message: text,
                });
        }
    }

    /// Emits a [`Severity::Critical`] record.
    pub fn critical(&self, component: &'static str, message: impl fmt::Display) {
        self.emit(Severity::Critical, component, message);
    }

    /// Emits a [`Severity::Error`] record.
    pub fn error(&self, component: &'static str, message: impl fmt::Display) {
        self.emit(Severity::Error, component, message);
    }

    /// Emits a [`Severity::Warning`] record.
    pub fn warning(&self, component: &'static str, message: impl fmt::Display) {
        self.emit(Severity::Warning, component, message);
    }

    /// Emits a [`Severity::Notice`] record.
    pub fn notice(&self, component: &'static str, message: impl fmt::Display) {
        self.emit(Severity::Notice, component, message);
    }

    /// Emits a [`Severity::Info`] record.
    pub fn info(&self, component: &'static str, message: impl fmt::Display) {
        self.emit(Severity::Info, component, message);
    }

    /// Emits a [`Severity::Debug`] record.
    pub fn debug(&self, component: &'static str, message: impl fmt::Display) {
        self.emit(Severity::Debug, component, message);
    }

    /// Snapshot of the captured records; empty unless built with capture.
    pub fn records(&self) -> Vec<Record> {
        self.inner.capture.as_ref().map_or_else(Vec::new, |capture| {
            capture
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        })
    }

    /// Captured records at `severity` or more severe.
    pub fn records_at_least(&self, severity: Severity) -> Vec<Record> {
        self.records()
            .into_iter()
            .filter(|record| record.severity.passes(severity))
            .collect()
    }

    /// Reports whether any captured record mentions `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.records()
            .iter()
            .any(|record| record.message.contains(needle))
    }
}

fn forward_to_tracing(severity: Severity, component: &'static str, text: &str) {
    match severity {
        Severity::Emergency | Severity::Alert | Severity::Critical | Severity::Error => {
            tracing::error!(target: "goanysync", component, severity = severity.as_str(), "{text}");
        }
        Severity::Warning => {
            tracing::warn!(target: "goanysync", component, "{text}");
        }
        Severity::Notice | Severity::Info => {
            tracing::info!(target: "goanysync", component, "{text}");
        }
        Severity::Debug => {
            tracing::debug!(target: "goanysync", component, "{text}");
        }
    }
}

/// Builder for a [`Logger`] with console, syslog and capture backends.
#[derive(Debug)]
pub struct LoggerBuilder {
    console: Option<Severity>,
    syslog: Option<(SyslogConfig, Severity)>,
    capture: bool,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            console: Some(DEFAULT_CONSOLE_THRESHOLD),
            syslog: None,
            capture: false,
        }
    }
}

impl LoggerBuilder {
    /// Sets the console threshold; `None` disables the console backend.
    #[must_use]
    pub fn console(mut self, threshold: Option<Severity>) -> Self {
        self.console = threshold;
        self
    }

    /// Attaches a syslog backend opened when [`build`](Self::build) runs.
    #[must_use]
    pub fn syslog(mut self, config: SyslogConfig, threshold: Severity) -> Self {
        self.syslog = Some((config, threshold));
        self
    }

    /// Keeps every record in memory as well.
    #[must_use]
    pub fn capture(mut self, enabled: bool) -> Self {
        self.capture = enabled;
        self
    }

    /// Opens the configured backends.
    pub fn build(self) -> Logger {
        let syslog = self.syslog.map(|(config, threshold)| SyslogBackend {
            threshold,
            _guard: config.open(),
        });
        Logger {
            inner: Arc::new(Inner {
                console: self.console,
                syslog,
                capture: self.capture.then(|| Mutex::new(Vec::new())),
            }),
        }
    }
}
