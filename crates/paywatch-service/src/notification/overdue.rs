//! Overdue Detector: payments whose due date has passed unpaid.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use paywatch_core::config::RulesConfig;
use paywatch_core::result::AppResult;
use paywatch_database::FinanceSource;
use paywatch_entity::finance::{CreditCard, FixedPayment, InstallmentPlan};
use paywatch_entity::notification::NotificationPriority;

use crate::calendar::{due_date_in_month, month_start};

/// One overdue entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverdueItem<T> {
    pub entity: T,
    /// The missed due date.
    pub due_date: NaiveDate,
    /// Whole days between the due date and today (at least 1).
    pub days_overdue: i64,
    pub priority: NotificationPriority,
}

/// Everything overdue for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverdueReport {
    pub fixed_payments: Vec<OverdueItem<FixedPayment>>,
    pub credit_cards: Vec<OverdueItem<CreditCard>>,
    pub installments: Vec<OverdueItem<InstallmentPlan>>,
}

impl OverdueReport {
    /// Total overdue entities.
    pub fn len(&self) -> usize {
        self.fixed_payments.len() + self.credit_cards.len() + self.installments.len()
    }

    /// Whether nothing is overdue.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Finds overdue fixed payments, credit cards and installments.
///
/// Fixed payments and cards are due on their due day of the current month
/// and count as paid when a payment was recorded on or after the first of
/// that month. Installments are due on their next due date while any
/// installment remains.
#[derive(Debug, Clone)]
pub struct OverdueDetector {
    high_priority_after_days: i64,
}

impl OverdueDetector {
    /// Build from rule configuration.
    pub fn from_config(config: &RulesConfig) -> Self {
        Self {
            high_priority_after_days: config.overdue_high_priority_after_days,
        }
    }

    /// Load a user's entities and scan them.
    pub async fn detect(
        &self,
        finance: &Arc<dyn FinanceSource>,
        user_id: Uuid,
        today: NaiveDate,
    ) -> AppResult<OverdueReport> {
        let fixed = finance.fixed_payments(user_id).await?;
        let cards = finance.credit_cards(user_id).await?;
        let installments = finance.installment_plans(user_id).await?;
        Ok(self.scan(&fixed, &cards, &installments, today))
    }

    /// Scan already loaded entities.
    pub fn scan(
        &self,
        fixed: &[FixedPayment],
        cards: &[CreditCard],
        installments: &[InstallmentPlan],
        today: NaiveDate,
    ) -> OverdueReport {
        OverdueReport {
            fixed_payments: fixed
                .iter()
                .filter(|p| p.is_active)
                .filter_map(|p| {
                    let due = due_date_in_month(today, p.valid_due_day()?);
                    self.monthly_item(p.clone(), due, p.last_paid_on, today)
                })
                .collect(),
            credit_cards: cards
                .iter()
                .filter(|c| c.is_active && c.has_balance())
                .filter_map(|c| {
                    let due = due_date_in_month(today, c.valid_due_day()?);
                    self.monthly_item(c.clone(), due, c.last_payment_on, today)
                })
                .collect(),
            installments: installments
                .iter()
                .filter(|i| i.is_active && i.remaining_installments() > 0)
                .filter_map(|i| self.item(i.clone(), i.next_due_date?, today))
                .collect(),
        }
    }

    fn monthly_item<T>(
        &self,
        entity: T,
        due: NaiveDate,
        last_paid: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Option<OverdueItem<T>> {
        if last_paid.is_some_and(|paid| paid >= month_start(due)) {
            return None;
        }
        self.item(entity, due, today)
    }

    fn item<T>(&self, entity: T, due: NaiveDate, today: NaiveDate) -> Option<OverdueItem<T>> {
        if today <= due {
            return None;
        }
        let days_overdue = (today - due).num_days();
        Some(OverdueItem {
            entity,
            due_date: due,
            days_overdue,
            priority: self.priority_for(days_overdue),
        })
    }

    /// `high` from the configured day count, `medium` below it.
    pub fn priority_for(&self, days_overdue: i64) -> NotificationPriority {
        if days_overdue >= self.high_priority_after_days {
            NotificationPriority::High
        } else {
            NotificationPriority::Medium
        }
    }
}

impl Default for OverdueDetector {
    fn default() -> Self {
        Self::from_config(&RulesConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paywatch_database::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn payment(due_day: i32, last_paid_on: Option<NaiveDate>) -> FixedPayment {
        FixedPayment {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: "Kira".into(),
            amount: 5000.0,
            due_day: Some(due_day),
            is_active: true,
            last_paid_on,
        }
    }

    fn card(balance: f64) -> CreditCard {
        CreditCard {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: "Bonus".into(),
            current_balance: balance,
            minimum_payment_rate: 20.0,
            payment_due_date: Some(5),
            is_active: true,
            last_payment_on: None,
        }
    }

    fn plan(paid: i32, total: i32, next_due: NaiveDate) -> InstallmentPlan {
        InstallmentPlan {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            item_name: "Laptop".into(),
            installment_amount: 1250.0,
            paid_installments: paid,
            total_installments: total,
            next_due_date: Some(next_due),
            is_active: true,
        }
    }

    #[test]
    fn test_unpaid_fixed_payment_is_overdue() {
        let report = OverdueDetector::default().scan(
            &[
                payment(1, None),
                payment(1, Some(date(2026, 9, 2))),
                payment(1, Some(date(2026, 8, 30))),
                payment(12, None),
            ],
            &[],
            &[],
            date(2026, 9, 12),
        );
        assert_eq!(report.fixed_payments.len(), 2);
        assert_eq!(report.fixed_payments[0].days_overdue, 11);
        assert_eq!(report.fixed_payments[0].priority, NotificationPriority::High);
    }

    #[test]
    fn test_due_today_is_not_overdue() {
        let report = OverdueDetector::default().scan(&[payment(12, None)], &[], &[], date(2026, 9, 12));
        assert!(report.is_empty());
    }

    #[test]
    fn test_card_needs_balance() {
        let report =
            OverdueDetector::default().scan(&[], &[card(0.0), card(300.0)], &[], date(2026, 9, 8));
        assert_eq!(report.credit_cards.len(), 1);
        assert_eq!(report.credit_cards[0].days_overdue, 3);
        assert_eq!(report.credit_cards[0].priority, NotificationPriority::Medium);
    }

    #[test]
    fn test_installments() {
        let report = OverdueDetector::default().scan(
            &[],
            &[],
            &[
                plan(3, 12, date(2026, 9, 1)),
                plan(12, 12, date(2026, 9, 1)),
                plan(3, 12, date(2026, 9, 20)),
            ],
            date(2026, 9, 8),
        );
        assert_eq!(report.installments.len(), 1);
        assert_eq!(report.installments[0].days_overdue, 7);
        assert_eq!(report.installments[0].priority, NotificationPriority::High);
    }

    #[tokio::test]
    async fn test_detect_reads_finance_source() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let mut p = payment(3, None);
        p.user_id = user;
        store.add_fixed_payment(p);

        let finance: Arc<dyn FinanceSource> = store;
        let report = OverdueDetector::default()
            .detect(&finance, user, date(2026, 9, 5))
            .await
            .unwrap();
        assert_eq!(report.fixed_payments.len(), 1);
        assert_eq!(report.fixed_payments[0].days_overdue, 2);
    }
}
