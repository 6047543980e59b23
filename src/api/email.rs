//! Outbound email delivery.
//!
//! One-time codes are sent through an HTTP email provider (Resend-compatible
//! JSON API). Without an API key the mailer degrades to logging the message,
//! which keeps local development working with no provider account.
//!
//! Transient provider failures (timeouts, connect errors, 429s, 5xx) are
//! retried once with jitter; anything else surfaces to the caller so the
//! handler can report a downstream failure instead of persisting a code the
//! user will never receive.

use anyhow::{Context, Result, bail};
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

const EMAIL_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const EMAIL_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const OTP_EMAIL_SUBJECT: &str = "Your Avizo Verification Code";

/// Provider acknowledgement for a delivered message.
#[derive(Clone, Debug)]
pub struct SendReceipt {
    pub message_id: Option<String>,
}

enum SendOutcome {
    Delivered(SendReceipt),
    Retryable(String),
}

enum Delivery {
    Http {
        client: reqwest::Client,
        endpoint: String,
        api_key: SecretString,
    },
    Log,
    #[cfg(test)]
    Failing,
}

pub struct Mailer {
    delivery: Delivery,
    from: String,
}

impl Mailer {
    /// Mailer backed by an HTTP provider endpoint.
    pub fn http(endpoint: String, api_key: SecretString, from: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .connect_timeout(EMAIL_CONNECT_TIMEOUT)
            .timeout(EMAIL_REQUEST_TIMEOUT)
            .build()
            .context("failed to build email HTTP client")?;

        Ok(Self {
            delivery: Delivery::Http {
                client,
                endpoint,
                api_key,
            },
            from,
        })
    }

    /// Local dev mailer that logs instead of sending real email.
    #[must_use]
    pub fn log(from: String) -> Self {
        Self {
            delivery: Delivery::Log,
            from,
        }
    }

    #[cfg(test)]
    pub(crate) fn failing() -> Self {
        Self {
            delivery: Delivery::Failing,
            from: "Avizo <no-reply@avizo.dev>".to_string(),
        }
    }

    /// Deliver a one-time code to `to`, retrying once on transient failures.
    pub async fn send_code(&self, to: &str, code: &str, ttl_minutes: i64) -> Result<SendReceipt> {
        match &self.delivery {
            Delivery::Http { .. } => self.send_http(to, code, ttl_minutes).await,
            Delivery::Log => {
                info!(
                    to_email = %to,
                    from = %self.from,
                    code = %code,
                    "email delivery disabled, logging one-time code instead"
                );
                Ok(SendReceipt { message_id: None })
            }
            #[cfg(test)]
            Delivery::Failing => bail!("email delivery rigged to fail"),
        }
    }

    async fn send_http(&self, to: &str, code: &str, ttl_minutes: i64) -> Result<SendReceipt> {
        match self.post_once(to, code, ttl_minutes).await? {
            SendOutcome::Delivered(receipt) => Ok(receipt),
            SendOutcome::Retryable(reason) => {
                let delay = retry_delay();
                warn!(
                    to_email = %to,
                    reason = %reason,
                    "transient email delivery failure, retrying in {}ms",
                    delay.as_millis()
                );
                sleep(delay).await;

                match self.post_once(to, code, ttl_minutes).await? {
                    SendOutcome::Delivered(receipt) => Ok(receipt),
                    SendOutcome::Retryable(reason) => {
                        bail!("email delivery failed after retry: {reason}")
                    }
                }
            }
        }
    }

    async fn post_once(&self, to: &str, code: &str, ttl_minutes: i64) -> Result<SendOutcome> {
        let Delivery::Http {
            client,
            endpoint,
            api_key,
        } = &self.delivery
        else {
            bail!("HTTP delivery is not configured");
        };

        let body = serde_json::json!({
            "from": self.from,
            "to": [to],
            "subject": OTP_EMAIL_SUBJECT,
            "html": render_otp_email(code, ttl_minutes),
        });

        let response = match client
            .post(endpoint)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) if err.is_timeout() || err.is_connect() => {
                return Ok(SendOutcome::Retryable(err.to_string()));
            }
            Err(err) => return Err(err).context("failed to reach email provider"),
        };

        let status = response.status();
        if status.is_success() {
            // Providers answer with a JSON document carrying the message id;
            // a missing or malformed body still counts as delivered.
            let message_id = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|value| value.get("id").and_then(|id| id.as_str()).map(String::from));
            return Ok(SendOutcome::Delivered(SendReceipt { message_id }));
        }

        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Ok(SendOutcome::Retryable(format!("provider returned {status}")));
        }

        bail!("email provider rejected message: {status}")
    }
}

fn retry_delay() -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(250..=750))
}

fn render_otp_email(code: &str, ttl_minutes: i64) -> String {
    format!(
        r#"<div style="font-family: sans-serif; max-width: 480px; margin: 0 auto;">
  <h2>Your verification code</h2>
  <p>Use the code below to sign in. It is valid for the next {ttl_minutes} minutes.</p>
  <p style="font-size: 32px; font-weight: bold; letter-spacing: 8px;">{code}</p>
  <p>If you didn't request this code, please ignore this email.</p>
  <hr />
  <p style="color: #6b7280; font-size: 12px;">Avizo - Community Safety Platform</p>
</div>"#
    )
}
