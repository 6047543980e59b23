use crate::api::{
    self,
    email::Mailer,
    handlers::{auth::AuthConfig, incidents::IncidentConfig},
};
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub frontend_base_url: String,
    pub otp_ttl_seconds: i64,
    pub otp_max_attempts: i32,
    pub session_ttl_seconds: i64,
    pub email_endpoint: String,
    pub email_from: String,
    pub email_api_key: Option<SecretString>,
    pub incident_ttl_seconds: i64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the mailer cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new(args.frontend_base_url)
        .with_otp_ttl_seconds(args.otp_ttl_seconds)
        .with_otp_max_attempts(args.otp_max_attempts)
        .with_session_ttl_seconds(args.session_ttl_seconds);

    // Without an API key there is nothing to authenticate against the email
    // provider, so deliveries are logged locally instead.
    let mailer = match args.email_api_key {
        Some(api_key) => Mailer::http(args.email_endpoint, api_key, args.email_from)?,
        None => Mailer::log(args.email_from),
    };

    let incident_config = IncidentConfig::new().with_ttl_seconds(args.incident_ttl_seconds);

    api::new(args.port, args.dsn, auth_config, mailer, incident_config).await
}
