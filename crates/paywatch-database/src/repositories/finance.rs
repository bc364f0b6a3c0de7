//! Financial entity repository implementation (read-only).

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use paywatch_core::error::{AppError, ErrorKind};
use paywatch_core::result::AppResult;
use paywatch_entity::finance::{CategorySpending, CreditCard, FixedPayment, InstallmentPlan};

use crate::store::FinanceSource;

/// Reads fixed payments, credit cards, installment plans and transactions.
///
/// Monetary `NUMERIC` columns are cast to `float8` in SQL.
#[derive(Debug, Clone)]
pub struct FinanceRepository {
    pool: PgPool,
}

impl FinanceRepository {
    /// Create a new finance repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FinanceSource for FinanceRepository {
    async fn fixed_payments(&self, user_id: Uuid) -> AppResult<Vec<FixedPayment>> {
        sqlx::query_as::<_, FixedPayment>(
            "SELECT id, user_id, name, amount::float8 AS amount, due_day, is_active, last_paid_on \
             FROM fixed_payments WHERE user_id = $1 AND is_active = TRUE",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load fixed payments", e))
    }

    async fn credit_cards(&self, user_id: Uuid) -> AppResult<Vec<CreditCard>> {
        sqlx::query_as::<_, CreditCard>(
            "SELECT id, user_id, name, current_balance::float8 AS current_balance, \
             minimum_payment_rate::float8 AS minimum_payment_rate, payment_due_date, \
             is_active, last_payment_on \
             FROM credit_cards WHERE user_id = $1 AND is_active = TRUE",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load credit cards", e))
    }

    async fn installment_plans(&self, user_id: Uuid) -> AppResult<Vec<InstallmentPlan>> {
        sqlx::query_as::<_, InstallmentPlan>(
            "SELECT id, user_id, item_name, installment_amount::float8 AS installment_amount, \
             paid_installments, total_installments, next_payment_date AS next_due_date, is_active \
             FROM installment_payments WHERE user_id = $1 AND is_active = TRUE",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load installment plans", e)
        })
    }

    async fn monthly_expenses(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> AppResult<Vec<CategorySpending>> {
        sqlx::query_as::<_, CategorySpending>(
            "SELECT category, SUM(amount)::float8 AS total \
             FROM transactions \
             WHERE user_id = $1 AND type = 'expense' \
               AND EXTRACT(YEAR FROM transaction_date) = $2 \
               AND EXTRACT(MONTH FROM transaction_date) = $3 \
             GROUP BY category",
        )
        .bind(user_id)
        .bind(year)
        .bind(month as i32)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to aggregate monthly expenses", e)
        })
    }
}
