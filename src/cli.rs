//! Command line interface.

use std::ffi::OsString;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};

use crate::config::{keys, FlagValue};
use crate::lifecycle::Flags;

#[derive(Parser, Debug)]
#[command(name = "pegnetd", version)]
#[command(
    about = "pegnetd is the pegnet daemon to track balances/conversion/transactions",
    long_about = None
)]
pub struct Cli {
    /// Change the logging level. Can choose from 'trace', 'debug', 'info', 'warn', 'error', or
    /// 'fatal'
    #[arg(long, global = true, default_value = keys::DEFAULT_LOGGING_LEVEL)]
    pub log: String,

    /// The url to the factomd endpoint without a trailing slash
    #[arg(short, long, global = true, default_value = keys::DEFAULT_SERVER)]
    pub server: String,

    /// The url to the factomd-wallet endpoint without a trailing slash
    #[arg(short, long, global = true, default_value = keys::DEFAULT_WALLET)]
    pub wallet: String,

    /// The url to the pegnetd endpoint without a trailing slash
    #[arg(short, long, global = true, default_value = keys::DEFAULT_PEGNETD)]
    pub pegnetd: String,

    /// Change the api listening port for the api
    #[arg(long, global = true, default_value = keys::DEFAULT_API_LISTEN)]
    pub api: String,

    /// If this flag is set, all v2 activations heights are set to 0.
    #[arg(long, global = true)]
    pub testing: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Query the sync status of a running pegnetd
    Status,
}

impl Cli {
    /// Parse the process arguments, exiting with usage on error.
    pub fn parse_with_flags() -> (Self, Flags) {
        Self::try_parse_with_flags(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Parse `args` and record which flags the user set explicitly.
    pub fn try_parse_with_flags<I, T>(args: I) -> Result<(Self, Flags), clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        let cli = Self::from_arg_matches(&matches)?;
        let flags = cli.flags(&matches);
        Ok((cli, flags))
    }

    fn flags(&self, matches: &ArgMatches) -> Flags {
        let flag = |id: &str, value: &str| FlagValue {
            value: value.into(),
            changed: explicitly_set(matches, id),
        };

        Flags {
            log: flag("log", &self.log),
            server: flag("server", &self.server),
            wallet: flag("wallet", &self.wallet),
            pegnetd: flag("pegnetd", &self.pegnetd),
            api: flag("api", &self.api),
            testing: self.testing,
        }
    }
}

/// Global flags may be given before or after the subcommand.
fn explicitly_set(matches: &ArgMatches, id: &str) -> bool {
    let on_command_line = |m: &ArgMatches| m.value_source(id) == Some(ValueSource::CommandLine);
    on_command_line(matches)
        || matches
            .subcommand()
            .map(|(_, sub)| on_command_line(sub))
            .unwrap_or(false)
}
