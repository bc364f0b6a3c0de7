//! Recurring fixed payment.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A monthly recurring payment such as rent or a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FixedPayment {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Amount due each month.
    pub amount: f64,
    /// Day of month the payment is due (1-31), if scheduled.
    pub due_day: Option<i32>,
    pub is_active: bool,
    /// Most recent date the payment was recorded as paid.
    pub last_paid_on: Option<NaiveDate>,
}

impl FixedPayment {
    /// The due day, when it is a valid day of month.
    pub fn valid_due_day(&self) -> Option<u32> {
        self.due_day
            .filter(|d| (1..=31).contains(d))
            .map(|d| d as u32)
    }
}
