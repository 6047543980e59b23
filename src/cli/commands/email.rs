use anyhow::{Context, Result};
use clap::{Arg, Command};
use secrecy::SecretString;

/// Outbound email settings parsed from CLI matches.
pub struct Options {
    pub endpoint: String,
    pub from: String,
    pub api_key: Option<SecretString>,
}

impl Options {
    /// # Errors
    /// Returns an error if an expected argument is missing from the matches.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        Ok(Self {
            endpoint: matches
                .get_one::<String>("email-endpoint")
                .cloned()
                .context("missing required argument: --email-endpoint")?,
            from: matches
                .get_one::<String>("email-from")
                .cloned()
                .context("missing required argument: --email-from")?,
            api_key: matches
                .get_one::<String>("email-api-key")
                .map(|key| SecretString::from(key.clone())),
        })
    }
}

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("email-endpoint")
                .long("email-endpoint")
                .help("Email provider send endpoint")
                .env("AVIZO_EMAIL_ENDPOINT")
                .default_value("https://api.resend.com/emails"),
        )
        .arg(
            Arg::new("email-from")
                .long("email-from")
                .help("From header for verification emails")
                .env("AVIZO_EMAIL_FROM")
                .default_value("Avizo <no-reply@avizo.dev>"),
        )
        .arg(
            Arg::new("email-api-key")
                .long("email-api-key")
                .help("Email provider API key; when unset, outbound email is logged instead of sent")
                .env("AVIZO_EMAIL_API_KEY"),
        )
}
