//! Delivery attempt status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of one outbound email attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "delivery_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Recorded, provider call not resolved yet.
    Queued,
    /// Accepted by the provider.
    Sent,
    /// Provider call failed.
    Failed,
    /// Reported undeliverable after acceptance.
    Bounced,
}

impl DeliveryStatus {
    /// Attempts only move out of `queued`, and only to a resolution.
    pub fn can_transition_to(&self, next: DeliveryStatus) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Sent) | (Self::Queued, Self::Failed)
        )
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Bounced => "bounced",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
