//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the API server with its full configuration state.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{auth, email, incident};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;
    let email_opts = email::Options::parse(matches)?;
    let incident_opts = incident::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        frontend_base_url: auth_opts.frontend_base_url,
        otp_ttl_seconds: auth_opts.otp_ttl_seconds,
        otp_max_attempts: auth_opts.otp_max_attempts,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        email_endpoint: email_opts.endpoint,
        email_from: email_opts.from,
        email_api_key: email_opts.api_key,
        incident_ttl_seconds: incident_opts.ttl_seconds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_action_from_env() -> Result<()> {
        temp_env::with_vars(
            [
                ("AVIZO_PORT", Some("9090")),
                ("AVIZO_DSN", Some("postgres://user@localhost:5432/avizo")),
                ("AVIZO_FRONTEND_BASE_URL", Some("http://localhost:3000")),
                ("AVIZO_OTP_TTL_SECONDS", Some("600")),
                ("AVIZO_OTP_MAX_ATTEMPTS", Some("5")),
                ("AVIZO_SESSION_TTL_SECONDS", Some("3600")),
                ("AVIZO_EMAIL_API_KEY", None),
                ("AVIZO_INCIDENT_TTL_SECONDS", Some("7200")),
            ],
            || -> Result<()> {
                let command = crate::cli::commands::new();
                let matches = command.try_get_matches_from(vec!["avizo"])?;
                let Action::Server(args) = handler(&matches)?;

                assert_eq!(args.port, 9090);
                assert_eq!(args.dsn, "postgres://user@localhost:5432/avizo");
                assert_eq!(args.frontend_base_url, "http://localhost:3000");
                assert_eq!(args.otp_ttl_seconds, 600);
                assert_eq!(args.otp_max_attempts, 5);
                assert_eq!(args.session_ttl_seconds, 3600);
                assert_eq!(args.email_endpoint, "https://api.resend.com/emails");
                assert!(args.email_api_key.is_none());
                assert_eq!(args.incident_ttl_seconds, 7200);
                Ok(())
            },
        )
    }
}
