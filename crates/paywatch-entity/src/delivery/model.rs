//! Delivery attempt entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::DeliveryStatus;

/// What an email was sent for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailType {
    /// Operator- or user-triggered test message.
    Test,
    /// Immediate alert for a high-priority notification.
    CriticalAlert,
    /// Daily summary of open notifications.
    DailyDigest,
}

impl EmailType {
    /// Return the type as its stored string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::CriticalAlert => "critical_alert",
            Self::DailyDigest => "daily_digest",
        }
    }
}

impl std::fmt::Display for EmailType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One outbound email try (`email_delivery_log` row).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeliveryAttempt {
    /// Unique attempt identifier.
    pub id: Uuid,
    /// User the email was about, if any.
    pub user_id: Option<Uuid>,
    /// Stored [`EmailType`] string.
    pub email_type: String,
    /// Recipient address.
    pub recipient_email: String,
    /// Subject line.
    pub subject: String,
    /// Current status.
    pub status: DeliveryStatus,
    /// Provider message id (set on `sent`).
    pub provider_message_id: Option<String>,
    /// Error text (set on `failed`).
    pub error_message: Option<String>,
    /// Zero for the first try, incremented by caller-side retries.
    pub retry_count: i32,
    /// When the provider accepted the message.
    pub sent_at: Option<DateTime<Utc>>,
    /// When the attempt was recorded.
    pub created_at: DateTime<Utc>,
}

/// Fields recorded when an attempt starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDeliveryAttempt {
    /// User the email was about, if any.
    pub user_id: Option<Uuid>,
    /// What the email was sent for.
    pub email_type: EmailType,
    /// Recipient address.
    pub recipient_email: String,
    /// Subject line.
    pub subject: String,
    /// Retry counter supplied by the caller.
    pub retry_count: i32,
}

/// How a queued attempt resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeliveryResolution {
    /// Provider accepted the message.
    Sent { message_id: String },
    /// Provider call failed.
    Failed { error: String },
}

impl DeliveryResolution {
    /// Status the attempt moves to.
    pub fn status(&self) -> DeliveryStatus {
        match self {
            Self::Sent { .. } => DeliveryStatus::Sent,
            Self::Failed { .. } => DeliveryStatus::Failed,
        }
    }
}
