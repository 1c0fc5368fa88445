//! Integration tests for the logger backends.
//!
//! Records flow through the public builder exactly as the engine and the
//! command-line front-end use it.

use logging::syslog::{SyslogConfig, SyslogFacility};
use logging::{Logger, Severity};

#[test]
fn capture_sees_records_below_every_backend_threshold() {
    let logger = Logger::builder()
        .console(Some(Severity::Error))
        .capture(true)
        .build();

    logger.debug("prepare", "created /tmp/volatile/goanysync-0-0/srv");
    logger.error("prepare", "rename failed");

    let records = logger.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].severity, Severity::Debug);
    assert_eq!(records[1].component, "prepare");
}

#[test]
fn syslog_backend_accepts_records() {
    let logger = Logger::builder()
        .console(None)
        .syslog(
            SyslogConfig::new(SyslogFacility::User, "goanysync-test"),
            Severity::Debug,
        )
        .capture(true)
        .build();

    logger.debug("lock", "integration smoke test, safe to ignore");
    assert!(logger.contains("smoke test"));
}

#[test]
fn severity_names_parse_from_configuration_strings() {
    assert_eq!("Warning".parse::<Severity>(), Ok(Severity::Warning));
    assert!("chatty".parse::<Severity>().is_err());
}
