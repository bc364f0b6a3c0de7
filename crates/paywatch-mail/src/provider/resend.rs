//! Resend HTTP API provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use paywatch_core::config::EmailConfig;
use paywatch_core::error::{AppError, ErrorKind};
use paywatch_core::result::AppResult;
use paywatch_core::traits::{EmailProvider, OutgoingEmail, ProviderError, ProviderReceipt};

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Sends through `POST {api_base_url}/emails`.
#[derive(Debug, Clone)]
pub struct ResendProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ResendProvider {
    /// Build a provider from the email configuration.
    pub fn from_config(config: &EmailConfig) -> AppResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|_| config.api_key_configured())
            .ok_or_else(|| AppError::configuration("Email API key is not configured"))?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/emails", config.api_base_url.trim_end_matches('/')),
            api_key,
        })
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    fn name(&self) -> &str {
        "resend"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<ProviderReceipt, ProviderError> {
        let body = SendRequest {
            from: &email.from,
            to: [&email.to],
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::http(408, format!("Request timed out: {e}"))
                } else {
                    ProviderError::transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .ok()
                .and_then(|err| err.message.or(err.name))
                .unwrap_or(text);
            debug!(status = status.as_u16(), error = %message, "Resend rejected email");
            return Err(ProviderError::http(status.as_u16(), message));
        }

        let receipt: SendResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::transport(format!("Malformed provider response: {e}")))?;

        Ok(ProviderReceipt { id: receipt.id })
    }
}
