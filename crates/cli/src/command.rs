//! Command-line grammar.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, builder::OsStringValueParser};
use config::DEFAULT_CONFIG_PATH;

/// The work requested on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    /// Crash repair.
    Check,
    /// Relocate sources.
    Prepare,
    /// Write volatile copies back.
    Flush,
    /// Put sources back, optionally deleting the volatile copies.
    Restore {
        /// Delete volatile copies after restoring.
        reclaim: bool,
    },
    /// Orphan guard, check, prepare.
    Start,
    /// Flush, restore with reclaim, orphan report.
    Stop,
    /// Status view.
    Info {
        /// Emit JSON instead of text.
        json: bool,
    },
}

impl Action {
    /// Subcommand name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Prepare => "prepare",
            Self::Flush => "flush",
            Self::Restore { .. } => "restore",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Info { .. } => "info",
        }
    }
}

/// A parsed command line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    /// Configuration file to load.
    pub config: PathBuf,
    /// Print the resolved configuration and log at debug level.
    pub verbose: bool,
    /// Send records to syslog.
    pub syslog: bool,
    /// What to do.
    pub action: Action,
}

pub(crate) fn clap_command(program_name: &'static str) -> Command {
    Command::new(program_name)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Keeps directories relocated onto tmpfs with a durable on-disk backup")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file to read")
                .value_parser(OsStringValueParser::new())
                .default_value(DEFAULT_CONFIG_PATH),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print the resolved configuration and debug messages")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-syslog")
                .long("no-syslog")
                .help("Do not send messages to syslog")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("check").about("Restore sources left dangling by a lost volatile copy"),
        )
        .subcommand(
            Command::new("prepare")
                .visible_alias("initsync")
                .about("Move sources onto volatile storage"),
        )
        .subcommand(
            Command::new("flush")
                .visible_alias("sync")
                .about("Write volatile copies back to their backups"),
        )
        .subcommand(
            Command::new("restore")
                .visible_alias("unsync")
                .about("Put sources back in place")
                .arg(
                    Arg::new("reclaim")
                        .long("reclaim")
                        .help("Delete the volatile copies afterwards")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("start").about("Orphan guard, then check and prepare"))
        .subcommand(Command::new("stop").about("Flush, restore and reclaim, then report orphans"))
        .subcommand(
            Command::new("info")
                .about("Show relocation state, usage and orphans")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
}

pub(crate) fn parse<I, S>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let matches = clap_command("goanysync").try_get_matches_from(args)?;
    Ok(invocation(&matches))
}

fn invocation(matches: &ArgMatches) -> Invocation {
    let config = matches
        .get_one::<OsString>("config")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    let action = match matches.subcommand() {
        Some(("prepare", _)) => Action::Prepare,
        Some(("flush", _)) => Action::Flush,
        Some(("restore", sub)) => Action::Restore {
            reclaim: sub.get_flag("reclaim"),
        },
        Some(("start", _)) => Action::Start,
        Some(("stop", _)) => Action::Stop,
        Some(("info", sub)) => Action::Info {
            json: sub.get_flag("json"),
        },
        _ => Action::Check,
    };

    Invocation {
        config,
        verbose: matches.get_flag("verbose"),
        syslog: !matches.get_flag("no-syslog"),
        action,
    }
}
