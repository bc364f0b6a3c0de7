//! Notification type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of condition a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// Fixed payment due in three days.
    #[sqlx(rename = "fixed_payment_3day")]
    #[serde(rename = "fixed_payment_3day")]
    FixedPayment3Day,
    /// Fixed payment due tomorrow.
    #[sqlx(rename = "fixed_payment_1day")]
    #[serde(rename = "fixed_payment_1day")]
    FixedPayment1Day,
    /// Fixed payment due today.
    FixedPaymentToday,
    /// Credit card statement due in five days.
    #[sqlx(rename = "credit_card_5day")]
    #[serde(rename = "credit_card_5day")]
    CreditCard5Day,
    /// Credit card statement due today.
    CreditCardToday,
    /// Category spending crossed the warning threshold.
    #[sqlx(rename = "budget_warning_80")]
    #[serde(rename = "budget_warning_80")]
    BudgetWarning80,
    /// Category spending reached or passed its ceiling.
    BudgetExceeded,
    /// Fixed payment past its due date.
    FixedPaymentOverdue,
    /// Credit card past its due date with an outstanding balance.
    CreditCardOverdue,
    /// Installment past its due date.
    InstallmentOverdue,
}

impl NotificationType {
    /// Every variant, in evaluation order.
    pub const ALL: [NotificationType; 10] = [
        Self::FixedPayment3Day,
        Self::FixedPayment1Day,
        Self::FixedPaymentToday,
        Self::CreditCard5Day,
        Self::CreditCardToday,
        Self::BudgetWarning80,
        Self::BudgetExceeded,
        Self::FixedPaymentOverdue,
        Self::CreditCardOverdue,
        Self::InstallmentOverdue,
    ];

    /// Overdue notifications are updated in place while the condition
    /// persists; every other type is deduplicated per calendar day.
    pub fn is_overdue(&self) -> bool {
        matches!(
            self,
            Self::FixedPaymentOverdue | Self::CreditCardOverdue | Self::InstallmentOverdue
        )
    }

    /// Return the type as its stored string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FixedPayment3Day => "fixed_payment_3day",
            Self::FixedPayment1Day => "fixed_payment_1day",
            Self::FixedPaymentToday => "fixed_payment_today",
            Self::CreditCard5Day => "credit_card_5day",
            Self::CreditCardToday => "credit_card_today",
            Self::BudgetWarning80 => "budget_warning_80",
            Self::BudgetExceeded => "budget_exceeded",
            Self::FixedPaymentOverdue => "fixed_payment_overdue",
            Self::CreditCardOverdue => "credit_card_overdue",
            Self::InstallmentOverdue => "installment_overdue",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = paywatch_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                paywatch_core::AppError::validation(format!("Invalid notification type: '{s}'"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_roundtrip_for_every_type() {
        for ty in NotificationType::ALL {
            assert_eq!(ty.as_str().parse::<NotificationType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_serde_name_matches_stored_name() {
        let json = serde_json::to_string(&NotificationType::FixedPayment3Day).unwrap();
        assert_eq!(json, "\"fixed_payment_3day\"");
    }

    #[test]
    fn test_only_overdue_types_are_ongoing() {
        let overdue: Vec<_> = NotificationType::ALL
            .into_iter()
            .filter(NotificationType::is_overdue)
            .collect();
        assert_eq!(overdue.len(), 3);
        assert!(!NotificationType::BudgetExceeded.is_overdue());
    }
}
