//! Monthly budget threshold alerts.

use std::collections::BTreeMap;

use uuid::Uuid;

use paywatch_core::config::RulesConfig;
use paywatch_entity::finance::CategorySpending;
use paywatch_entity::notification::{
    NewNotification, NotificationPayload, NotificationPriority, NotificationType, RelatedEntity,
};

use super::money;

/// Compares current-month spending against per-category ceilings.
///
/// `warning_percent <= usage < exceeded_percent` yields a warning and
/// `usage >= exceeded_percent` yields an exceeded alert, never both.
#[derive(Debug, Clone)]
pub struct BudgetRule {
    warning_percent: f64,
    exceeded_percent: f64,
    thresholds: BTreeMap<String, f64>,
}

impl BudgetRule {
    /// Build from rule configuration.
    pub fn from_config(config: &RulesConfig) -> Self {
        Self {
            warning_percent: config.budget_warning_percent,
            exceeded_percent: config.budget_exceeded_percent,
            thresholds: config.budget_thresholds.clone(),
        }
    }

    /// Evaluate the month's spending; categories without a ceiling are ignored.
    pub fn evaluate(&self, user_id: Uuid, spending: &[CategorySpending]) -> Vec<NewNotification> {
        spending
            .iter()
            .filter_map(|row| {
                let budget = *self.thresholds.get(&row.category)?;
                self.alert(user_id, &row.category, row.total, budget)
            })
            .collect()
    }

    fn alert(&self, user_id: Uuid, category: &str, spent: f64, budget: f64) -> Option<NewNotification> {
        if budget <= 0.0 {
            return None;
        }
        // Multiply first so exact boundaries such as 800 / 1000 land on 80.
        let percentage = spent * 100.0 / budget;
        let rounded = (percentage * 100.0).round() / 100.0;

        if percentage >= self.exceeded_percent {
            let overage = spent - budget;
            Some(NewNotification {
                user_id,
                notification_type: NotificationType::BudgetExceeded,
                title: format!("{category} bütçesi aşıldı!"),
                message: format!(
                    "{category} kategorisinde bütçenizi {} TL aştınız ({} TL / {} TL)",
                    money(overage),
                    money(spent),
                    money(budget)
                ),
                priority: NotificationPriority::High,
                related: RelatedEntity::BudgetCategory(category.to_string()),
                payload: NotificationPayload::BudgetExceeded {
                    category: category.to_string(),
                    spent,
                    budget,
                    overage: (overage * 100.0).round() / 100.0,
                    percentage: rounded,
                },
            })
        } else if percentage >= self.warning_percent {
            Some(NewNotification {
                user_id,
                notification_type: NotificationType::BudgetWarning80,
                title: format!("{category} bütçesi uyarısı"),
                message: format!(
                    "{category} kategorisinde bütçenizin %{}'ini kullandınız ({} TL / {} TL)",
                    percentage.round() as i64,
                    money(spent),
                    money(budget)
                ),
                priority: NotificationPriority::Medium,
                related: RelatedEntity::BudgetCategory(category.to_string()),
                payload: NotificationPayload::BudgetWarning {
                    category: category.to_string(),
                    spent,
                    budget,
                    percentage: rounded,
                },
            })
        } else {
            None
        }
    }
}

impl Default for BudgetRule {
    fn default() -> Self {
        Self::from_config(&RulesConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spend(category: &str, total: f64) -> CategorySpending {
        CategorySpending {
            category: category.into(),
            total,
        }
    }

    fn kinds(spending: &[CategorySpending]) -> Vec<NotificationType> {
        BudgetRule::default()
            .evaluate(Uuid::nil(), spending)
            .into_iter()
            .map(|n| n.notification_type)
            .collect()
    }

    #[test]
    fn test_warning_boundary_is_inclusive() {
        assert_eq!(kinds(&[spend("Ulaşım", 800.0)]), vec![NotificationType::BudgetWarning80]);
        assert_eq!(kinds(&[spend("Eğlence", 400.0)]), vec![NotificationType::BudgetWarning80]);
        assert!(kinds(&[spend("Ulaşım", 799.99)]).is_empty());
    }

    #[test]
    fn test_exceeded_replaces_warning() {
        assert_eq!(kinds(&[spend("Ulaşım", 1000.0)]), vec![NotificationType::BudgetExceeded]);
        assert_eq!(kinds(&[spend("Ulaşım", 999.99)]), vec![NotificationType::BudgetWarning80]);
        assert_eq!(kinds(&[spend("Ulaşım", 2500.0)]), vec![NotificationType::BudgetExceeded]);
    }

    #[test]
    fn test_unknown_category_ignored() {
        assert!(kinds(&[spend("Kripto", 1_000_000.0)]).is_empty());
    }

    #[test]
    fn test_messages() {
        let rule = BudgetRule::default();
        let warning = &rule.evaluate(Uuid::nil(), &[spend("Eğlence", 425.0)])[0];
        assert_eq!(
            warning.message,
            "Eğlence kategorisinde bütçenizin %85'ini kullandınız (425.00 TL / 500.00 TL)"
        );
        assert_eq!(warning.related.key(), "budget:Eğlence");

        let exceeded = &rule.evaluate(Uuid::nil(), &[spend("Eğlence", 620.5)])[0];
        assert_eq!(exceeded.title, "Eğlence bütçesi aşıldı!");
        assert_eq!(
            exceeded.message,
            "Eğlence kategorisinde bütçenizi 120.50 TL aştınız (620.50 TL / 500.00 TL)"
        );
    }

    #[test]
    fn test_fractional_budget_printed_with_two_decimals() {
        let mut config = RulesConfig::default();
        config.budget_thresholds.insert("Kırtasiye".into(), 333.333);
        let rule = BudgetRule::from_config(&config);

        let alert = &rule.evaluate(Uuid::nil(), &[spend("Kırtasiye", 300.0)])[0];
        assert_eq!(alert.notification_type, NotificationType::BudgetWarning80);
        assert!(alert.message.ends_with("(300.00 TL / 333.33 TL)"), "{}", alert.message);
    }
}
