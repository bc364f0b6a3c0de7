//! The entity a notification is about.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The financial entity a notification refers to.
///
/// Budget notifications are about a spending category rather than a row,
/// so they carry the category name and no entity id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "ref", rename_all = "snake_case")]
pub enum RelatedEntity {
    /// A recurring fixed payment.
    FixedPayment(Uuid),
    /// A credit card.
    CreditCard(Uuid),
    /// An installment purchase plan.
    Installment(Uuid),
    /// A monthly budget category.
    BudgetCategory(String),
}

impl RelatedEntity {
    /// Stored `related_entity_type` value.
    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::FixedPayment(_) => "fixed_payment",
            Self::CreditCard(_) => "credit_card",
            Self::Installment(_) => "installment_payment",
            Self::BudgetCategory(_) => "budget",
        }
    }

    /// Stored `related_entity_id` value.
    pub fn entity_id(&self) -> Option<Uuid> {
        match self {
            Self::FixedPayment(id) | Self::CreditCard(id) | Self::Installment(id) => Some(*id),
            Self::BudgetCategory(_) => None,
        }
    }

    /// Deduplication key, unique per entity within a user.
    pub fn key(&self) -> String {
        match self {
            Self::FixedPayment(id) | Self::CreditCard(id) | Self::Installment(id) => {
                format!("{}:{id}", self.entity_type())
            }
            Self::BudgetCategory(category) => format!("budget:{category}"),
        }
    }
}
