use anyhow::{Context, Result};
use clap::{Arg, Command};

/// Incident settings parsed from CLI matches.
pub struct Options {
    pub ttl_seconds: i64,
}

impl Options {
    /// # Errors
    /// Returns an error if an expected argument is missing from the matches.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        Ok(Self {
            ttl_seconds: matches
                .get_one::<i64>("incident-ttl-seconds")
                .copied()
                .context("missing required argument: --incident-ttl-seconds")?,
        })
    }
}

pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new("incident-ttl-seconds")
            .long("incident-ttl-seconds")
            .help("Lifetime of a new report before the expiration sweep retires it")
            .env("AVIZO_INCIDENT_TTL_SECONDS")
            .default_value("86400")
            .value_parser(clap::value_parser!(i64)),
    )
}
