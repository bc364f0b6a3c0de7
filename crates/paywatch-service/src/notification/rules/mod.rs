//! Rule evaluators.
//!
//! Each evaluator is a pure function of a user's entities and the date; none
//! of them touch a store.

pub mod budget;
pub mod credit_card;
pub mod fixed_payment;
pub mod overdue;

use paywatch_core::config::RulesConfig;

pub use budget::BudgetRule;
pub use credit_card::CreditCardRule;
pub use fixed_payment::FixedPaymentRule;
pub use overdue::OverdueRule;

use super::overdue::OverdueDetector;

/// The evaluator set, in the order candidates are admitted.
#[derive(Debug, Clone)]
pub struct NotificationRules {
    pub fixed_payments: FixedPaymentRule,
    pub credit_cards: CreditCardRule,
    pub budgets: BudgetRule,
    pub overdue: OverdueRule,
    pub detector: OverdueDetector,
}

impl NotificationRules {
    /// Build the evaluators from rule configuration.
    pub fn from_config(config: &RulesConfig) -> Self {
        Self {
            fixed_payments: FixedPaymentRule,
            credit_cards: CreditCardRule,
            budgets: BudgetRule::from_config(config),
            overdue: OverdueRule,
            detector: OverdueDetector::from_config(config),
        }
    }
}

impl Default for NotificationRules {
    fn default() -> Self {
        Self::from_config(&RulesConfig::default())
    }
}

/// Render an amount the way messages show money.
pub(crate) fn money(amount: f64) -> String {
    format!("{amount:.2}")
}
