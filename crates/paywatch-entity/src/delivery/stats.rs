//! Aggregate delivery statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Optional filters for [`DeliveryStats`] queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryStatsFilter {
    /// Restrict to one user.
    pub user_id: Option<Uuid>,
    /// Inclusive lower bound on `created_at`.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub to: Option<DateTime<Utc>>,
}

/// Per-email-type counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TypeDeliveryStats {
    /// Stored email type.
    pub email_type: String,
    /// All attempts.
    pub total: i64,
    /// Attempts with status `sent`.
    pub sent: i64,
    /// Attempts with status `failed`.
    pub failed: i64,
    /// Attempts with status `bounced`.
    pub bounced: i64,
    /// Attempts still `queued`.
    pub queued: i64,
}

/// Counts across all email types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryTotals {
    pub total: i64,
    pub sent: i64,
    pub failed: i64,
    pub bounced: i64,
    pub queued: i64,
}

/// Delivery statistics over the log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryStats {
    /// Summed counts.
    pub totals: DeliveryTotals,
    /// Breakdown by email type.
    pub by_type: Vec<TypeDeliveryStats>,
    /// `sent / total` as a percentage, rounded to two decimals.
    pub success_rate: f64,
}

impl DeliveryStats {
    /// Build totals and success rate from the per-type rows.
    pub fn from_by_type(by_type: Vec<TypeDeliveryStats>) -> Self {
        let totals = by_type
            .iter()
            .fold(DeliveryTotals::default(), |mut acc, row| {
                acc.total += row.total;
                acc.sent += row.sent;
                acc.failed += row.failed;
                acc.bounced += row.bounced;
                acc.queued += row.queued;
                acc
            });

        let success_rate = if totals.total > 0 {
            ((totals.sent as f64 / totals.total as f64) * 10_000.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            totals,
            by_type,
            success_rate,
        }
    }
}
