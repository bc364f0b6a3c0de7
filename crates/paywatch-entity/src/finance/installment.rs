//! Installment purchase plan.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A purchase paid off in fixed installments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InstallmentPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    /// What was bought.
    pub item_name: String,
    /// Amount of each installment.
    pub installment_amount: f64,
    /// Installments already paid.
    pub paid_installments: i32,
    /// Installments in the plan.
    pub total_installments: i32,
    /// Due date of the next unpaid installment.
    pub next_due_date: Option<NaiveDate>,
    pub is_active: bool,
}

impl InstallmentPlan {
    /// Installments still to pay.
    pub fn remaining_installments(&self) -> i32 {
        (self.total_installments - self.paid_installments).max(0)
    }

    /// 1-based number of the next installment.
    pub fn next_installment_number(&self) -> i32 {
        self.paid_installments + 1
    }
}
