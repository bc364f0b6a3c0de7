//! Email provider trait: the black-box send primitive behind the dispatcher.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A fully composed message ready for the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    /// `From:` header, e.g. `Budget App <notifications@budgetapp.site>`.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
    /// Plain-text body.
    pub text: String,
}

/// Provider acknowledgement of an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderReceipt {
    /// Provider-assigned message identifier.
    pub id: String,
}

/// Failure reported by a provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    /// Provider or transport error text.
    pub message: String,
    /// HTTP status code, when the failure came from an HTTP response.
    pub status: Option<u16>,
}

impl ProviderError {
    /// Failure with an HTTP status.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Failure without a status (transport, decoding).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }
}

/// Outbound email transport.
///
/// Implementations perform exactly one delivery attempt per call; retries,
/// pacing and circuit breaking are layered on top by the dispatcher.
#[async_trait]
pub trait EmailProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Hand one message to the provider.
    async fn send(&self, email: &OutgoingEmail) -> Result<ProviderReceipt, ProviderError>;
}
