//! Credit card.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A credit card with a monthly statement due day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CreditCard {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Outstanding balance.
    pub current_balance: f64,
    /// Minimum payment as a percentage of the balance.
    pub minimum_payment_rate: f64,
    /// Day of month the statement is due (1-31), if known.
    pub payment_due_date: Option<i32>,
    pub is_active: bool,
    /// Most recent date a payment was made on the card.
    pub last_payment_on: Option<NaiveDate>,
}

impl CreditCard {
    /// `balance × minimum_payment_rate / 100`.
    pub fn minimum_payment(&self) -> f64 {
        self.current_balance * self.minimum_payment_rate / 100.0
    }

    /// The due day, when it is a valid day of month.
    pub fn valid_due_day(&self) -> Option<u32> {
        self.payment_due_date
            .filter(|d| (1..=31).contains(d))
            .map(|d| d as u32)
    }

    /// Whether any balance is outstanding.
    pub fn has_balance(&self) -> bool {
        self.current_balance > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_payment() {
        let card = CreditCard {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            name: "Bonus".into(),
            current_balance: 12_000.0,
            minimum_payment_rate: 20.0,
            payment_due_date: Some(10),
            is_active: true,
            last_payment_on: None,
        };
        assert_eq!(card.minimum_payment(), 2_400.0);
        assert_eq!(card.valid_due_day(), Some(10));
    }
}
