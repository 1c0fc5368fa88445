//! Syslog backend for unattended runs.
//!
//! Uses libc `openlog`/`syslog`/`closelog` directly rather than pulling in a
//! dedicated syslog crate. Every record is written with a `%s` format so
//! paths containing `%` never reach the C formatter as directives.

use std::ffi::CString;
use std::fmt;
use std::sync::OnceLock;

use crate::Severity;

/// Syslog facility codes matching the POSIX syslog(3) constants.
///
/// The configuration file names a facility with `SYSLOG_FACILITY`; the name
/// is mapped onto one of these variants via [`SyslogFacility::from_name`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(i32)]
pub enum SyslogFacility {
    /// Kernel messages (LOG_KERN).
    Kern = libc::LOG_KERN,
    /// User-level messages (LOG_USER).
    User = libc::LOG_USER,
    /// Mail system (LOG_MAIL).
    Mail = libc::LOG_MAIL,
    /// System daemons (LOG_DAEMON).
    #[default]
    Daemon = libc::LOG_DAEMON,
    /// Security/authorization messages (LOG_AUTH).
    Auth = libc::LOG_AUTH,
    /// Messages generated internally by syslogd (LOG_SYSLOG).
    Syslog = libc::LOG_SYSLOG,
    /// Line printer subsystem (LOG_LPR).
    Lpr = libc::LOG_LPR,
    /// Network news subsystem (LOG_NEWS).
    News = libc::LOG_NEWS,
    /// UUCP subsystem (LOG_UUCP).
    Uucp = libc::LOG_UUCP,
    /// Clock daemon (LOG_CRON).
    Cron = libc::LOG_CRON,
    /// Reserved for local use (LOG_LOCAL0).
    Local0 = libc::LOG_LOCAL0,
    /// Reserved for local use (LOG_LOCAL1).
    Local1 = libc::LOG_LOCAL1,
    /// Reserved for local use (LOG_LOCAL2).
    Local2 = libc::LOG_LOCAL2,
    /// Reserved for local use (LOG_LOCAL3).
    Local3 = libc::LOG_LOCAL3,
    /// Reserved for local use (LOG_LOCAL4).
    Local4 = libc::LOG_LOCAL4,
    /// Reserved for local use (LOG_LOCAL5).
    Local5 = libc::LOG_LOCAL5,
    /// Reserved for local use (LOG_LOCAL6).
    Local6 = libc::LOG_LOCAL6,
    /// Reserved for local use (LOG_LOCAL7).
    Local7 = libc::LOG_LOCAL7,
}

impl SyslogFacility {
    /// Parses a case-insensitive facility name.
    ///
    /// Returns `None` for unrecognised names.
    ///
    /// # Examples
    ///
    /// ```
    /// use logging::syslog::SyslogFacility;
    ///
    /// assert_eq!(SyslogFacility::from_name("daemon"), Some(SyslogFacility::Daemon));
    /// assert_eq!(SyslogFacility::from_name("LOCAL3"), Some(SyslogFacility::Local3));
    /// assert_eq!(SyslogFacility::from_name("unknown"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "kern" => Some(Self::Kern),
            "user" => Some(Self::User),
            "mail" => Some(Self::Mail),
            "daemon" => Some(Self::Daemon),
            "auth" => Some(Self::Auth),
            "syslog" => Some(Self::Syslog),
            "lpr" => Some(Self::Lpr),
            "news" => Some(Self::News),
            "uucp" => Some(Self::Uucp),
            "cron" => Some(Self::Cron),
            "local0" => Some(Self::Local0),
            "local1" => Some(Self::Local1),
            "local2" => Some(Self::Local2),
            "local3" => Some(Self::Local3),
            "local4" => Some(Self::Local4),
            "local5" => Some(Self::Local5),
            "local6" => Some(Self::Local6),
            "local7" => Some(Self::Local7),
            _ => None,
        }
    }

    /// Returns the facility name as written in the configuration file.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kern => "kern",
            Self::User => "user",
            Self::Mail => "mail",
            Self::Daemon => "daemon",
            Self::Auth => "auth",
            Self::Syslog => "syslog",
            Self::Lpr => "lpr",
            Self::News => "news",
            Self::Uucp => "uucp",
            Self::Cron => "cron",
            Self::Local0 => "local0",
            Self::Local1 => "local1",
            Self::Local2 => "local2",
            Self::Local3 => "local3",
            Self::Local4 => "local4",
            Self::Local5 => "local5",
            Self::Local6 => "local6",
            Self::Local7 => "local7",
        }
    }
}

impl fmt::Display for SyslogFacility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ident passed to `openlog(3)`.
pub const SYSLOG_IDENT: &str = "goanysync";

/// Facility and ident used when opening the syslog connection.
///
/// Constructing a [`SyslogConfig`] does not open anything; call
/// [`open`](SyslogConfig::open) to begin routing messages.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyslogConfig {
    facility: SyslogFacility,
    ident: String,
}

impl SyslogConfig {
    /// Creates a configuration with the given facility and ident.
    pub fn new(facility: SyslogFacility, ident: impl Into<String>) -> Self {
        Self {
            facility,
            ident: ident.into(),
        }
    }

    /// Returns the configured facility.
    pub const fn facility(&self) -> SyslogFacility {
        self.facility
    }

    /// Returns the configured ident.
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// Opens the syslog connection and returns a guard that closes it on drop.
    ///
    /// Only one connection is meaningful per process; the ident of the first
    /// call is kept for the life of the process because syslog(3) retains the
    /// pointer.
    pub fn open(&self) -> SyslogGuard {
        static IDENT: OnceLock<CString> = OnceLock::new();
        let ident = IDENT.get_or_init(|| {
            CString::new(self.ident.as_str())
                .unwrap_or_else(|_| CString::from(c"goanysync"))
        });

        // SAFETY: the ident pointer lives in a static for the rest of the
        // process, and openlog is called from the main thread before any
        // record is emitted.
        unsafe {
            libc::openlog(ident.as_ptr(), libc::LOG_PID, self.facility as libc::c_int);
        }

        SyslogGuard { _private: () }
    }
}

impl Default for SyslogConfig {
    fn default() -> Self {
        Self::new(SyslogFacility::default(), SYSLOG_IDENT)
    }
}

/// Sends one message to syslog(3) at the priority matching `severity`.
///
/// Messages containing an interior NUL byte are dropped.
pub fn syslog_message(severity: Severity, message: &str) {
    let Ok(c_message) = CString::new(message) else {
        return;
    };

    // SAFETY: both arguments are valid NUL-terminated strings and syslog is
    // thread-safe once openlog has run; without openlog the C library falls
    // back to its default ident and facility.
    unsafe {
        libc::syslog(
            severity.syslog_priority(),
            c"%s".as_ptr(),
            c_message.as_ptr(),
        );
    }
}

/// RAII guard that calls `closelog(3)` when dropped.
#[derive(Debug)]
pub struct SyslogGuard {
    _private: (),
}

impl Drop for SyslogGuard {
    fn drop(&mut self) {
        // SAFETY: closelog has no preconditions.
        unsafe {
            libc::closelog();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_facility_is_daemon() {
        assert_eq!(SyslogFacility::default(), SyslogFacility::Daemon);
    }

    #[test]
    fn from_name_recognises_every_facility() {
        let cases = [
            ("kern", SyslogFacility::Kern),
            ("user", SyslogFacility::User),
            ("mail", SyslogFacility::Mail),
            ("daemon", SyslogFacility::Daemon),
            ("auth", SyslogFacility::Auth),
            ("syslog", SyslogFacility::Syslog),
            ("lpr", SyslogFacility::Lpr),
            ("news", SyslogFacility::News),
            ("uucp", SyslogFacility::Uucp),
            ("cron", SyslogFacility::Cron),
            ("local0", SyslogFacility::Local0),
            ("local1", SyslogFacility::Local1),
            ("local2", SyslogFacility::Local2),
            ("local3", SyslogFacility::Local3),
            ("local4", SyslogFacility::Local4),
            ("local5", SyslogFacility::Local5),
            ("local6", SyslogFacility::Local6),
            ("local7", SyslogFacility::Local7),
        ];

        for (name, expected) in cases {
            assert_eq!(
                SyslogFacility::from_name(name),
                Some(expected),
                "failed for facility name '{name}'"
            );
            assert_eq!(expected.as_str(), name);
        }
    }

    #[test]
    fn from_name_is_case_insensitive_and_trims() {
        assert_eq!(
            SyslogFacility::from_name("DAEMON"),
            Some(SyslogFacility::Daemon)
        );
        assert_eq!(
            SyslogFacility::from_name(" Local7 "),
            Some(SyslogFacility::Local7)
        );
    }

    #[test]
    fn from_name_rejects_unknown() {
        assert_eq!(SyslogFacility::from_name(""), None);
        assert_eq!(SyslogFacility::from_name("local8"), None);
        assert_eq!(SyslogFacility::from_name("LOG_DAEMON"), None);
    }

    #[test]
    fn facility_values_match_libc_constants() {
        assert_eq!(SyslogFacility::User as i32, libc::LOG_USER);
        assert_eq!(SyslogFacility::Daemon as i32, libc::LOG_DAEMON);
        assert_eq!(SyslogFacility::Local0 as i32, libc::LOG_LOCAL0);
        assert_eq!(SyslogFacility::Local7 as i32, libc::LOG_LOCAL7);
    }

    #[test]
    fn config_default_uses_daemon_and_goanysync_ident() {
        let config = SyslogConfig::default();
        assert_eq!(config.facility(), SyslogFacility::Daemon);
        assert_eq!(config.ident(), SYSLOG_IDENT);
    }

    #[test]
    fn open_and_log_do_not_panic() {
        let config = SyslogConfig::new(SyslogFacility::User, "goanysync-test");
        let _guard = config.open();
        syslog_message(Severity::Debug, "syslog backend smoke test");
        syslog_message(Severity::Debug, "percent signs stay literal: %s %n");
    }

    #[test]
    fn interior_nul_is_dropped_silently() {
        syslog_message(Severity::Debug, "before\0after");
    }
}
