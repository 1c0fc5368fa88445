#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` carries the diagnostics plumbing shared by the goanysync
//! workspace: the [`Severity`] scale, the injectable [`Logger`] capability,
//! the syslog(3) backend and the console subscriber.
//!
//! # Design
//!
//! Components never reach for a global logger. They receive a [`Logger`]
//! at construction and emit records tagged with a component name. The
//! logger fans each record out to:
//!
//! - the console through `tracing` (installed with [`init_tracing`]);
//! - syslog, when a backend was attached with [`LoggerBuilder::syslog`];
//! - an in-memory buffer, when built with capture enabled.
//!
//! # Examples
//!
//! ```
//! use logging::{Logger, Severity};
//!
//! let logger = Logger::capturing();
//! logger.error("prepare", "/srv/cache: backup already exists");
//! assert_eq!(logger.records_at_least(Severity::Error).len(), 1);
//! ```

mod levels;
mod logger;
mod subscriber;
pub mod syslog;

pub use levels::{Severity, UnknownSeverity};
pub use logger::{
    DEFAULT_CONSOLE_THRESHOLD, DEFAULT_SYSLOG_THRESHOLD, Logger, LoggerBuilder, Record,
};
pub use subscriber::{LOG_ENV, console_filter, default_directive, init_tracing};
