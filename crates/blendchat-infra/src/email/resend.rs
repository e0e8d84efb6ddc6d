//! ResendMailer -- concrete [`Mailer`] implementation for the Resend API.
//!
//! Sends one message per call to `POST /emails` with Bearer
//! authentication. Delivery is per-recipient and independent; callers
//! treat failures as best-effort. The API key is wrapped in
//! [`secrecy::SecretString`] and never logged.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use blendchat_core::email::mailer::Mailer;
use blendchat_types::email::{EmailError, OutboundEmail};

#[derive(Debug, Serialize)]
struct ResendSendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Resend email provider.
// No Debug derive, same reasoning as the completion provider.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    from: String,
}

impl ResendMailer {
    const DEFAULT_BASE_URL: &'static str = "https://api.resend.com";

    /// Create a new mailer. `api_key` may be absent; sends then fail with
    /// `MissingCredential`, which callers log and swallow.
    pub fn new(api_key: Option<SecretString>, from: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            from,
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

impl Mailer for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError> {
        let Some(api_key) = &self.api_key else {
            return Err(EmailError::MissingCredential);
        };

        let body = ResendSendRequest {
            from: &self.from,
            to: [email.to.as_str()],
            subject: &email.subject,
            html: &email.html,
        };
        let url = format!("{}/emails", self.base_url);
        debug!(to = %email.to, "sending email");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                422 => EmailError::InvalidRecipient(email.to.clone()),
                _ => EmailError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        Ok(())
    }
}
