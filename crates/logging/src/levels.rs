//! crates/logging/src/levels.rs
//! Severity levels shared by the console, syslog and capture backends.

use std::fmt;
use std::str::FromStr;

/// Severity of a log record, ordered from most to least severe.
///
/// The variants mirror the POSIX syslog(3) priorities so a record can be
/// forwarded to syslog without translation. Comparison follows the syslog
/// numbering: `Severity::Emergency < Severity::Debug`, and a record passes a
/// threshold when `record <= threshold`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    /// System is unusable.
    Emergency,
    /// Action must be taken immediately.
    Alert,
    /// Critical conditions, such as a lock that can no longer be trusted.
    Critical,
    /// Error conditions that abort the processing of a source.
    Error,
    /// Conditions worth an operator's attention.
    Warning,
    /// Normal but significant conditions.
    Notice,
    /// Informational messages.
    Info,
    /// Debug-level messages.
    Debug,
}

impl Severity {
    /// Every severity from most to least severe.
    pub const ALL: [Self; 8] = [
        Self::Emergency,
        Self::Alert,
        Self::Critical,
        Self::Error,
        Self::Warning,
        Self::Notice,
        Self::Info,
        Self::Debug,
    ];

    /// Returns the lowercase name accepted by [`Severity::from_name`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Alert => "alert",
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    /// Returns the short bracketed label printed in front of console lines.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Emergency => "EMERG",
            Self::Alert => "ALERT",
            Self::Critical => "CRIT",
            Self::Error => "ERR",
            Self::Warning => "WARN",
            Self::Notice => "NOTICE",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }

    /// Parses a case-insensitive severity name.
    ///
    /// Both the long names (`warning`) and the syslog abbreviations (`warn`,
    /// `err`, `crit`, `emerg`) are recognised.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "emergency" | "emerg" => Some(Self::Emergency),
            "alert" => Some(Self::Alert),
            "critical" | "crit" => Some(Self::Critical),
            "error" | "err" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "notice" => Some(Self::Notice),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }

    /// Reports whether a record of this severity passes `threshold`.
    pub fn passes(self, threshold: Self) -> bool {
        self <= threshold
    }

    /// Returns the matching `LOG_*` priority constant from `<syslog.h>`.
    pub const fn syslog_priority(self) -> libc::c_int {
        match self {
            Self::Emergency => libc::LOG_EMERG,
            Self::Alert => libc::LOG_ALERT,
            Self::Critical => libc::LOG_CRIT,
            Self::Error => libc::LOG_ERR,
            Self::Warning => libc::LOG_WARNING,
            Self::Notice => libc::LOG_NOTICE,
            Self::Info => libc::LOG_INFO,
            Self::Debug => libc::LOG_DEBUG,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a severity name is not recognised.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownSeverity(String);

impl fmt::Display for UnknownSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown severity '{}'", self.0)
    }
}

impl std::error::Error for UnknownSeverity {}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownSeverity(s.to_owned()))
    }
}
