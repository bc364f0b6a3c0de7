//! Aggregated monthly spending.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Sum of a user's expense transactions in one category for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CategorySpending {
    /// Expense category name.
    pub category: String,
    /// Total spent.
    pub total: f64,
}
