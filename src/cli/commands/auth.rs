use anyhow::{Context, Result};
use clap::{Arg, Command};

/// Auth settings parsed from CLI matches.
pub struct Options {
    pub frontend_base_url: String,
    pub otp_ttl_seconds: i64,
    pub otp_max_attempts: i32,
    pub session_ttl_seconds: i64,
}

impl Options {
    /// # Errors
    /// Returns an error if an expected argument is missing from the matches.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        Ok(Self {
            frontend_base_url: matches
                .get_one::<String>("frontend-base-url")
                .cloned()
                .context("missing required argument: --frontend-base-url")?,
            otp_ttl_seconds: matches
                .get_one::<i64>("otp-ttl-seconds")
                .copied()
                .context("missing required argument: --otp-ttl-seconds")?,
            otp_max_attempts: matches
                .get_one::<i32>("otp-max-attempts")
                .copied()
                .context("missing required argument: --otp-max-attempts")?,
            session_ttl_seconds: matches
                .get_one::<i64>("session-ttl-seconds")
                .copied()
                .context("missing required argument: --session-ttl-seconds")?,
        })
    }
}

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("frontend-base-url")
                .long("frontend-base-url")
                .help("Frontend base URL, allowed as CORS origin and used to mark session cookies Secure")
                .env("AVIZO_FRONTEND_BASE_URL")
                .default_value("https://avizo.dev"),
        )
        .arg(
            Arg::new("otp-ttl-seconds")
                .long("otp-ttl-seconds")
                .help("One-time code TTL in seconds")
                .env("AVIZO_OTP_TTL_SECONDS")
                .default_value("1800")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("otp-max-attempts")
                .long("otp-max-attempts")
                .help("Failed submissions allowed before a code is revoked")
                .env("AVIZO_OTP_MAX_ATTEMPTS")
                .default_value("3")
                .value_parser(clap::value_parser!(i32)),
        )
        .arg(
            Arg::new("session-ttl-seconds")
                .long("session-ttl-seconds")
                .help("Session TTL in seconds")
                .env("AVIZO_SESSION_TTL_SECONDS")
                .default_value("2592000")
                .value_parser(clap::value_parser!(i64)),
        )
}
