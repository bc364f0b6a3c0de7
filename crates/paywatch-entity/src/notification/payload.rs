//! Typed notification payloads, one shape per notification family.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Structured data attached to a notification.
///
/// Persisted as JSONB; the `kind` tag selects the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationPayload {
    /// Upcoming fixed payment.
    FixedPaymentDue {
        payment_id: Uuid,
        payment_name: String,
        amount: f64,
        due_day: u32,
        days_until_due: u32,
    },
    /// Upcoming credit card deadline.
    CreditCardDue {
        card_id: Uuid,
        card_name: String,
        current_balance: f64,
        minimum_payment: f64,
        due_day: u32,
        days_until_due: u32,
    },
    /// Category spending at or above the warning threshold.
    BudgetWarning {
        category: String,
        spent: f64,
        budget: f64,
        percentage: f64,
    },
    /// Category spending at or above the ceiling.
    BudgetExceeded {
        category: String,
        spent: f64,
        budget: f64,
        overage: f64,
        percentage: f64,
    },
    /// Fixed payment past due.
    FixedPaymentOverdue {
        payment_id: Uuid,
        payment_name: String,
        amount: f64,
        due_date: NaiveDate,
        days_overdue: i64,
    },
    /// Credit card past due.
    CreditCardOverdue {
        card_id: Uuid,
        card_name: String,
        current_balance: f64,
        minimum_payment: f64,
        due_date: NaiveDate,
        days_overdue: i64,
    },
    /// Installment past due.
    InstallmentOverdue {
        installment_id: Uuid,
        item_name: String,
        installment_amount: f64,
        installment_number: i32,
        total_installments: i32,
        due_date: NaiveDate,
        days_overdue: i64,
    },
}

impl NotificationPayload {
    /// Days overdue, for the overdue variants.
    pub fn days_overdue(&self) -> Option<i64> {
        match self {
            Self::FixedPaymentOverdue { days_overdue, .. }
            | Self::CreditCardOverdue { days_overdue, .. }
            | Self::InstallmentOverdue { days_overdue, .. } => Some(*days_overdue),
            _ => None,
        }
    }
}
