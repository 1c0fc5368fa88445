#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` is the command-line front-end of goanysync. It parses the command
//! line with [`clap`], loads the configuration, sets up logging, takes the
//! process lock, runs one engine verb and maps the result to an
//! [`ExitCode`].
//!
//! # Design
//!
//! [`run`] takes the arguments together with handles for standard output
//! and error so tests can drive it in-process. The binary wires it into
//! `main` and aborts when [`ExitCode::LockIntegrity`] comes back.
//!
//! # Invariants
//!
//! - The lock is held for the whole verb and released on every path that
//!   acquired it.
//! - Per-source skips are logged and never change the exit status.
//!
//! # Examples
//!
//! ```
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let code = cli::run(["goanysync", "--version"], &mut stdout, &mut stderr);
//!
//! assert_eq!(code, 0);
//! assert!(String::from_utf8_lossy(&stdout).starts_with("goanysync "));
//! ```

mod command;
mod exit_code;

use std::ffi::OsString;
use std::io::Write;

use clap::error::ErrorKind;
use config::{Options, writer};
use engine::{CommandMirror, EngineError, Layout, Lock, Orchestrator, VerbReport};
use logging::syslog::{SYSLOG_IDENT, SyslogConfig};
use logging::{DEFAULT_CONSOLE_THRESHOLD, DEFAULT_SYSLOG_THRESHOLD, Logger, Severity};

pub use command::{Action, Invocation};
pub use exit_code::ExitCode;

/// Maximum exit code representable by a Unix process.
const MAX_EXIT_CODE: i32 = u8::MAX as i32;

/// Converts a status returned by [`run`] into a process exit code,
/// clamping it into `0..=255`.
///
/// ```
/// assert_eq!(cli::exit_code_from(0), std::process::ExitCode::SUCCESS);
/// ```
#[must_use]
pub fn exit_code_from(status: i32) -> std::process::ExitCode {
    let clamped = status.clamp(0, MAX_EXIT_CODE);
    std::process::ExitCode::from(u8::try_from(clamped).unwrap_or(u8::MAX))
}

/// Runs one invocation and returns the process exit status.
pub fn run<I, S, Out, Err>(args: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
    Out: Write,
    Err: Write,
{
    let invocation = match command::parse(args) {
        Ok(invocation) => invocation,
        Err(error) => return report_parse_error(&error, stdout, stderr).as_i32(),
    };
    execute(&invocation, stdout, stderr).as_i32()
}

fn report_parse_error<Out: Write, Err: Write>(
    error: &clap::Error,
    stdout: &mut Out,
    stderr: &mut Err,
) -> ExitCode {
    let rendered = error.render().to_string();
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = write!(stdout, "{rendered}");
            ExitCode::Ok
        }
        _ => {
            let _ = write!(stderr, "{rendered}");
            ExitCode::Syntax
        }
    }
}

/// Runs a parsed invocation.
pub fn execute<Out: Write, Err: Write>(
    invocation: &Invocation,
    stdout: &mut Out,
    stderr: &mut Err,
) -> ExitCode {
    logging::init_tracing(invocation.verbose);

    let options = match Options::load(&invocation.config) {
        Ok(options) => options,
        Err(error) => {
            let _ = writeln!(stderr, "goanysync: {error}");
            return ExitCode::Config;
        }
    };

    let logger = build_logger(invocation, &options);
    for key in options.ignored_keys() {
        logger.debug("config", format_args!("ignoring unknown key '{key}'"));
    }
    if invocation.verbose {
        let _ = write!(stdout, "{}", writer::render(&options.to_config_file()));
    }

    let lock = Lock::new(options.lock_dir(), logger.clone()).with_timeout(options.lock_timeout());
    let guard = match lock.acquire() {
        Ok(guard) => guard,
        Err(error) => {
            logger.error("lock", &error);
            let _ = writeln!(stderr, "goanysync: {error}");
            return ExitCode::Lock;
        }
    };

    let orchestrator = Orchestrator::new(
        Layout::new(options.volatile_root()),
        options.sources().to_vec(),
        CommandMirror::new(options.copy_tool()),
        logger.clone(),
    );
    let code = dispatch(invocation, &orchestrator, &logger, stdout, stderr);

    match guard.release() {
        Ok(()) => code,
        Err(error) => {
            logger.emit(Severity::Emergency, "lock", &error);
            let _ = writeln!(stderr, "goanysync: {error}");
            ExitCode::LockIntegrity
        }
    }
}

fn build_logger(invocation: &Invocation, options: &Options) -> Logger {
    let console = if invocation.verbose {
        Severity::Debug
    } else {
        DEFAULT_CONSOLE_THRESHOLD
    };
    let mut builder = Logger::builder().console(Some(console));
    if invocation.syslog {
        let threshold = if invocation.verbose {
            Severity::Debug
        } else {
            DEFAULT_SYSLOG_THRESHOLD
        };
        builder = builder.syslog(
            SyslogConfig::new(options.syslog_facility(), SYSLOG_IDENT),
            threshold,
        );
    }
    builder.build()
}

fn dispatch<Out: Write, Err: Write>(
    invocation: &Invocation,
    orchestrator: &Orchestrator<CommandMirror>,
    logger: &Logger,
    stdout: &mut Out,
    stderr: &mut Err,
) -> ExitCode {
    let verbose = invocation.verbose;
    let result: Result<Vec<VerbReport>, EngineError> = match invocation.action {
        Action::Check => Ok(vec![orchestrator.check()]),
        Action::Prepare => orchestrator.prepare().map(|report| vec![report]),
        Action::Flush => Ok(vec![orchestrator.flush()]),
        Action::Restore { reclaim } => Ok(vec![orchestrator.restore(reclaim)]),
        Action::Start => orchestrator.start(),
        Action::Stop => orchestrator.stop(),
        Action::Info { json } => {
            return match orchestrator.status() {
                Ok(status) => print_status(&status, json, stdout, stderr),
                Err(error) => fail(&error, invocation.action, logger, stderr),
            };
        }
    };

    match result {
        Ok(reports) => {
            if verbose {
                for report in &reports {
                    let _ = write!(stdout, "{report}");
                }
            }
            ExitCode::Ok
        }
        Err(error) => fail(&error, invocation.action, logger, stderr),
    }
}

fn fail<Err: Write>(
    error: &EngineError,
    action: Action,
    logger: &Logger,
    stderr: &mut Err,
) -> ExitCode {
    logger.error(action.name(), error);
    if let EngineError::OrphansFound { report } | EngineError::OrphansLeft { report } = error {
        for orphan in report.orphans() {
            let _ = writeln!(stderr, "goanysync: orphan {orphan}");
        }
    }
    if let EngineError::Unflushed { sources } = error {
        for source in sources {
            let _ = writeln!(stderr, "goanysync: still relocated {}", source.display());
        }
    }
    let _ = writeln!(stderr, "goanysync: {}: {error}", action.name());
    ExitCode::Verb
}

fn print_status<Out: Write, Err: Write>(
    status: &engine::StatusReport,
    json: bool,
    stdout: &mut Out,
    stderr: &mut Err,
) -> ExitCode {
    if !json {
        let _ = write!(stdout, "{status}");
        return ExitCode::Ok;
    }
    match serde_json::to_string_pretty(status) {
        Ok(text) => {
            let _ = writeln!(stdout, "{text}");
            ExitCode::Ok
        }
        Err(error) => {
            let _ = writeln!(stderr, "goanysync: cannot encode status: {error}");
            ExitCode::Verb
        }
    }
}
