//! Per-user notification pipeline.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use paywatch_core::result::AppResult;
use paywatch_database::{FinanceSource, NotificationStore};
use paywatch_entity::notification::{NewNotification, Notification};

use super::gate::{AdmitOutcome, DedupGate};
use super::rules::NotificationRules;

/// What one user's run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserRunSummary {
    pub created: Vec<Notification>,
    pub updated: Vec<Notification>,
    pub skipped: usize,
}

impl UserRunSummary {
    fn record(&mut self, outcome: AdmitOutcome) {
        match outcome {
            AdmitOutcome::Created(n) => self.created.push(n),
            AdmitOutcome::Updated(n) => self.updated.push(n),
            AdmitOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// Runs every evaluator for one user and admits the candidates.
///
/// Candidates are admitted in the order fixed payments, credit cards,
/// budgets, overdue payments. The first read or write error aborts the
/// user and is returned to the caller.
#[derive(Debug, Clone)]
pub struct NotificationGenerator {
    finance: Arc<dyn FinanceSource>,
    gate: DedupGate,
    rules: NotificationRules,
}

impl NotificationGenerator {
    /// Creates a new notification generator.
    pub fn new(
        finance: Arc<dyn FinanceSource>,
        notifications: Arc<dyn NotificationStore>,
        rules: NotificationRules,
    ) -> Self {
        Self {
            finance,
            gate: DedupGate::new(notifications),
            rules,
        }
    }

    /// Evaluate a user's entities without persisting anything.
    pub async fn candidates(&self, user_id: Uuid, today: NaiveDate) -> AppResult<Vec<NewNotification>> {
        let fixed = self.finance.fixed_payments(user_id).await?;
        let cards = self.finance.credit_cards(user_id).await?;
        let spending = self
            .finance
            .monthly_expenses(user_id, today.year(), today.month())
            .await?;
        let installments = self.finance.installment_plans(user_id).await?;

        let overdue = self.rules.detector.scan(&fixed, &cards, &installments, today);

        let mut out = self.rules.fixed_payments.evaluate(user_id, today, &fixed);
        out.extend(self.rules.credit_cards.evaluate(user_id, today, &cards));
        out.extend(self.rules.budgets.evaluate(user_id, &spending));
        out.extend(self.rules.overdue.evaluate(user_id, &overdue));

        debug!(
            user_id = %user_id,
            fixed_payments = fixed.len(),
            credit_cards = cards.len(),
            categories = spending.len(),
            overdue = overdue.len(),
            candidates = out.len(),
            "Evaluated notification rules"
        );
        Ok(out)
    }

    /// Evaluate and persist one user's notifications for `today`.
    pub async fn run_for_user(&self, user_id: Uuid, today: NaiveDate) -> AppResult<UserRunSummary> {
        let candidates = self.candidates(user_id, today).await?;
        let mut summary = UserRunSummary::default();
        for candidate in &candidates {
            summary.record(self.gate.admit(candidate, today).await?);
        }

        info!(
            user_id = %user_id,
            created = summary.created.len(),
            updated = summary.updated.len(),
            skipped = summary.skipped,
            "User notifications generated"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paywatch_database::MemoryStore;
    use paywatch_entity::finance::{CreditCard, FixedPayment};
    use paywatch_entity::notification::NotificationType;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn generator(store: &Arc<MemoryStore>) -> NotificationGenerator {
        NotificationGenerator::new(store.clone(), store.clone(), NotificationRules::default())
    }

    fn rent(user_id: Uuid) -> FixedPayment {
        FixedPayment {
            id: Uuid::new_v4(),
            user_id,
            name: "Rent".into(),
            amount: 5000.0,
            due_day: Some(15),
            is_active: true,
            last_paid_on: None,
        }
    }

    #[tokio::test]
    async fn test_rent_end_to_end() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        store.add_fixed_payment(rent(user));

        let summary = generator(&store).run_for_user(user, date(9, 12)).await.unwrap();
        assert_eq!(summary.created.len(), 1);

        let stored = store.notifications_for(user);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].notification_type, NotificationType::FixedPayment3Day);
        assert!(stored[0].message.contains("3 gün sonra"));
        assert!(stored[0].message.contains("5000"));
    }

    #[tokio::test]
    async fn test_second_run_same_day_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        store.add_fixed_payment(rent(user));
        let generator = generator(&store);

        generator.run_for_user(user, date(9, 12)).await.unwrap();
        let second = generator.run_for_user(user, date(9, 12)).await.unwrap();
        assert_eq!(second.created.len(), 0);
        assert_eq!(second.skipped, 1);
        assert_eq!(store.notifications_for(user).len(), 1);
    }

    #[tokio::test]
    async fn test_candidates_are_ordered_by_category() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let today = date(9, 12);
        store.add_fixed_payment(rent(user));
        store.add_credit_card(CreditCard {
            id: Uuid::new_v4(),
            user_id: user,
            name: "Bonus".into(),
            current_balance: 900.0,
            minimum_payment_rate: 20.0,
            payment_due_date: Some(2),
            is_active: true,
            last_payment_on: None,
        });
        store.add_expense(user, "Eğlence", today, 450.0);

        let kinds: Vec<_> = generator(&store)
            .candidates(user, today)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.notification_type)
            .collect();
        assert_eq!(
            kinds,
            vec![
                NotificationType::FixedPayment3Day,
                NotificationType::BudgetWarning80,
                NotificationType::CreditCardOverdue,
            ]
        );
    }

    #[tokio::test]
    async fn test_overdue_updates_in_place_across_days() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let mut payment = rent(user);
        payment.due_day = Some(1);
        store.add_fixed_payment(payment);
        let generator = generator(&store);

        let first = generator.run_for_user(user, date(9, 3)).await.unwrap();
        let id = first.created[0].id;

        let second = generator.run_for_user(user, date(9, 4)).await.unwrap();
        assert!(second.created.is_empty());
        assert_eq!(second.updated[0].id, id);

        let stored = store.notifications_for(user);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].payload.days_overdue(), Some(3));
        assert!(stored[0].message.contains("3 gün önce"));
    }
}
