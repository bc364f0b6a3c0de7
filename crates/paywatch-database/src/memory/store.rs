use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use uuid::Uuid;

use paywatch_core::error::AppError;
use paywatch_core::result::AppResult;
use paywatch_entity::delivery::{
    DeliveryAttempt, DeliveryResolution, DeliveryStats, DeliveryStatsFilter, DeliveryStatus,
    NewDeliveryAttempt, TypeDeliveryStats,
};
use paywatch_entity::finance::{CategorySpending, CreditCard, FixedPayment, InstallmentPlan};
use paywatch_entity::notification::{
    NewNotification, Notification, NotificationType, NotificationUpdate,
};
use paywatch_entity::recipient::Recipient;
use sqlx::types::Json;

use crate::store::{
    DeliveryLogStore, FinanceSource, NotificationStore, RecipientSource, UserSource,
};

#[derive(Debug, Clone)]
struct Expense {
    user_id: Uuid,
    category: String,
    date: NaiveDate,
    amount: f64,
}

#[derive(Debug, Default)]
struct MemoryState {
    active_users: Vec<Uuid>,
    fixed_payments: Vec<FixedPayment>,
    credit_cards: Vec<CreditCard>,
    installments: Vec<InstallmentPlan>,
    expenses: Vec<Expense>,
    recipients: Vec<Recipient>,
    notifications: Vec<Notification>,
    deliveries: Vec<DeliveryAttempt>,
    failing_users: HashSet<Uuid>,
    notifications_unavailable: bool,
}

/// Shared in-memory store.
///
/// Seed it with the `add_*` methods, then hand it (behind an `Arc`) to the
/// components under test as any of the store traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register an active user.
    pub fn add_user(&self, user_id: Uuid) {
        let mut state = self.lock();
        if !state.active_users.contains(&user_id) {
            state.active_users.push(user_id);
        }
    }

    /// Add a fixed payment.
    pub fn add_fixed_payment(&self, payment: FixedPayment) {
        self.lock().fixed_payments.push(payment);
    }

    /// Add a credit card.
    pub fn add_credit_card(&self, card: CreditCard) {
        self.lock().credit_cards.push(card);
    }

    /// Add an installment plan.
    pub fn add_installment(&self, plan: InstallmentPlan) {
        self.lock().installments.push(plan);
    }

    /// Record an expense transaction.
    pub fn add_expense(&self, user_id: Uuid, category: &str, date: NaiveDate, amount: f64) {
        self.lock().expenses.push(Expense {
            user_id,
            category: category.to_string(),
            date,
            amount,
        });
    }

    /// Add or replace a recipient.
    pub fn add_recipient(&self, recipient: Recipient) {
        let mut state = self.lock();
        state.recipients.retain(|r| r.user_id != recipient.user_id);
        state.recipients.push(recipient);
    }

    /// Make every finance read for `user_id` fail.
    pub fn fail_finance_for(&self, user_id: Uuid) {
        self.lock().failing_users.insert(user_id);
    }

    /// Make every notification store call fail.
    pub fn set_notifications_unavailable(&self, unavailable: bool) {
        self.lock().notifications_unavailable = unavailable;
    }

    /// Mark a notification dismissed, as the user-facing layer would.
    pub fn dismiss(&self, id: Uuid) {
        if let Some(n) = self.lock().notifications.iter_mut().find(|n| n.id == id) {
            n.is_dismissed = true;
        }
    }

    /// Snapshot of every stored notification.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    /// Snapshot of the stored notifications for one user.
    pub fn notifications_for(&self, user_id: Uuid) -> Vec<Notification> {
        self.lock()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Snapshot of every delivery attempt, oldest first.
    pub fn delivery_attempts(&self) -> Vec<DeliveryAttempt> {
        self.lock().deliveries.clone()
    }

    fn check_finance(state: &MemoryState, user_id: Uuid) -> AppResult<()> {
        if state.failing_users.contains(&user_id) {
            return Err(AppError::database(format!(
                "Finance data unavailable for user {user_id}"
            )));
        }
        Ok(())
    }

    fn check_notifications(state: &MemoryState) -> AppResult<()> {
        if state.notifications_unavailable {
            return Err(AppError::database("Notification store unavailable"));
        }
        Ok(())
    }

    fn conflicts(existing: &Notification, candidate: &NewNotification, key: &str, day: NaiveDate) -> bool {
        existing.is_open()
            && existing.user_id == candidate.user_id
            && existing.notification_type == candidate.notification_type
            && existing.related_key == key
            && (candidate.notification_type.is_overdue() || existing.created_on == day)
    }
}

#[async_trait]
impl UserSource for MemoryStore {
    async fn active_user_ids(&self) -> AppResult<Vec<Uuid>> {
        Ok(self.lock().active_users.clone())
    }
}

#[async_trait]
impl FinanceSource for MemoryStore {
    async fn fixed_payments(&self, user_id: Uuid) -> AppResult<Vec<FixedPayment>> {
        let state = self.lock();
        Self::check_finance(&state, user_id)?;
        Ok(state
            .fixed_payments
            .iter()
            .filter(|p| p.user_id == user_id && p.is_active)
            .cloned()
            .collect())
    }

    async fn credit_cards(&self, user_id: Uuid) -> AppResult<Vec<CreditCard>> {
        let state = self.lock();
        Self::check_finance(&state, user_id)?;
        Ok(state
            .credit_cards
            .iter()
            .filter(|c| c.user_id == user_id && c.is_active)
            .cloned()
            .collect())
    }

    async fn installment_plans(&self, user_id: Uuid) -> AppResult<Vec<InstallmentPlan>> {
        let state = self.lock();
        Self::check_finance(&state, user_id)?;
        Ok(state
            .installments
            .iter()
            .filter(|p| p.user_id == user_id && p.is_active)
            .cloned()
            .collect())
    }

    async fn monthly_expenses(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> AppResult<Vec<CategorySpending>> {
        let state = self.lock();
        Self::check_finance(&state, user_id)?;

        let mut totals: Vec<CategorySpending> = Vec::new();
        for expense in state.expenses.iter().filter(|e| {
            e.user_id == user_id && e.date.year() == year && e.date.month() == month
        }) {
            match totals.iter_mut().find(|t| t.category == expense.category) {
                Some(total) => total.total += expense.amount,
                None => totals.push(CategorySpending {
                    category: expense.category.clone(),
                    total: expense.amount,
                }),
            }
        }
        Ok(totals)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn find_open_on(
        &self,
        user_id: Uuid,
        notification_type: NotificationType,
        related_key: &str,
        day: NaiveDate,
    ) -> AppResult<Option<Notification>> {
        let state = self.lock();
        Self::check_notifications(&state)?;
        Ok(state
            .notifications
            .iter()
            .find(|n| {
                n.is_open()
                    && n.user_id == user_id
                    && n.notification_type == notification_type
                    && n.related_key == related_key
                    && n.created_on == day
            })
            .cloned())
    }

    async fn find_open(
        &self,
        user_id: Uuid,
        notification_type: NotificationType,
        related_key: &str,
    ) -> AppResult<Option<Notification>> {
        let state = self.lock();
        Self::check_notifications(&state)?;
        Ok(state
            .notifications
            .iter()
            .filter(|n| {
                n.is_open()
                    && n.user_id == user_id
                    && n.notification_type == notification_type
                    && n.related_key == related_key
            })
            .max_by_key(|n| n.created_at)
            .cloned())
    }

    async fn insert(
        &self,
        notification: &NewNotification,
        created_on: NaiveDate,
    ) -> AppResult<Option<Notification>> {
        let mut state = self.lock();
        Self::check_notifications(&state)?;

        let key = notification.related.key();
        if state
            .notifications
            .iter()
            .any(|n| Self::conflicts(n, notification, &key, created_on))
        {
            return Ok(None);
        }

        let now = Utc::now();
        let stored = Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            notification_type: notification.notification_type,
            title: notification.title.clone(),
            message: notification.message.clone(),
            priority: notification.priority,
            related_entity_type: Some(notification.related.entity_type().to_string()),
            related_entity_id: notification.related.entity_id(),
            related_key: key,
            payload: Json(notification.payload.clone()),
            is_read: false,
            is_dismissed: false,
            created_on,
            created_at: now,
            updated_at: now,
        };
        state.notifications.push(stored.clone());
        Ok(Some(stored))
    }

    async fn update_in_place(
        &self,
        id: Uuid,
        update: &NotificationUpdate,
    ) -> AppResult<Notification> {
        let mut state = self.lock();
        Self::check_notifications(&state)?;

        let existing = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;
        existing.title = update.title.clone();
        existing.message = update.message.clone();
        existing.priority = update.priority;
        existing.payload = Json(update.payload.clone());
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn list_open_unread(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        let state = self.lock();
        Self::check_notifications(&state)?;
        let mut open: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && n.is_open() && n.is_unread())
            .cloned()
            .collect();
        open.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(open)
    }
}

#[async_trait]
impl DeliveryLogStore for MemoryStore {
    async fn record(&self, attempt: &NewDeliveryAttempt) -> AppResult<DeliveryAttempt> {
        let stored = DeliveryAttempt {
            id: Uuid::new_v4(),
            user_id: attempt.user_id,
            email_type: attempt.email_type.as_str().to_string(),
            recipient_email: attempt.recipient_email.clone(),
            subject: attempt.subject.clone(),
            status: DeliveryStatus::Queued,
            provider_message_id: None,
            error_message: None,
            retry_count: attempt.retry_count,
            sent_at: None,
            created_at: Utc::now(),
        };
        self.lock().deliveries.push(stored.clone());
        Ok(stored)
    }

    async fn resolve(
        &self,
        id: Uuid,
        resolution: &DeliveryResolution,
    ) -> AppResult<DeliveryAttempt> {
        let mut state = self.lock();
        let attempt = state
            .deliveries
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::not_found(format!("Delivery attempt {id} not found")))?;

        if !attempt.status.can_transition_to(resolution.status()) {
            return Err(AppError::conflict(format!(
                "Delivery attempt {id} is already {}",
                attempt.status
            )));
        }

        attempt.status = resolution.status();
        match resolution {
            DeliveryResolution::Sent { message_id } => {
                attempt.provider_message_id = Some(message_id.clone());
                attempt.sent_at = Some(Utc::now());
            }
            DeliveryResolution::Failed { error } => {
                attempt.error_message = Some(error.clone());
            }
        }
        Ok(attempt.clone())
    }

    async fn by_user(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<DeliveryAttempt>> {
        Ok(self
            .lock()
            .deliveries
            .iter()
            .rev()
            .filter(|a| a.user_id == Some(user_id))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn stats(&self, filter: &DeliveryStatsFilter) -> AppResult<DeliveryStats> {
        let state = self.lock();
        let mut by_type: Vec<TypeDeliveryStats> = Vec::new();

        for attempt in state.deliveries.iter().filter(|a| {
            filter.user_id.is_none_or(|u| a.user_id == Some(u))
                && filter.from.is_none_or(|from| a.created_at >= from)
                && filter.to.is_none_or(|to| a.created_at <= to)
        }) {
            let idx = match by_type.iter().position(|t| t.email_type == attempt.email_type) {
                Some(idx) => idx,
                None => {
                    by_type.push(TypeDeliveryStats {
                        email_type: attempt.email_type.clone(),
                        ..Default::default()
                    });
                    by_type.len() - 1
                }
            };
            let row = &mut by_type[idx];
            row.total += 1;
            match attempt.status {
                DeliveryStatus::Sent => row.sent += 1,
                DeliveryStatus::Failed => row.failed += 1,
                DeliveryStatus::Bounced => row.bounced += 1,
                DeliveryStatus::Queued => row.queued += 1,
            }
        }

        by_type.sort_by(|a, b| a.email_type.cmp(&b.email_type));
        Ok(DeliveryStats::from_by_type(by_type))
    }

    async fn recent_failures(&self, limit: i64) -> AppResult<Vec<DeliveryAttempt>> {
        Ok(self
            .lock()
            .deliveries
            .iter()
            .rev()
            .filter(|a| a.status == DeliveryStatus::Failed)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RecipientSource for MemoryStore {
    async fn recipient(&self, user_id: Uuid) -> AppResult<Option<Recipient>> {
        Ok(self
            .lock()
            .recipients
            .iter()
            .find(|r| r.user_id == user_id)
            .cloned())
    }

    async fn digest_recipients(&self) -> AppResult<Vec<Recipient>> {
        let state = self.lock();
        Ok(state
            .recipients
            .iter()
            .filter(|r| r.wants_digest() && state.active_users.contains(&r.user_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paywatch_entity::delivery::EmailType;
    use paywatch_entity::notification::{
        NotificationPayload, NotificationPriority, RelatedEntity,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn overdue_candidate(user_id: Uuid, payment_id: Uuid, days: i64) -> NewNotification {
        NewNotification {
            user_id,
            notification_type: NotificationType::FixedPaymentOverdue,
            title: "Ödeme Gecikti: Kira".into(),
            message: format!("Kira ödemesi {days} gün önce yapılmalıydı - 5000.00 TL"),
            priority: NotificationPriority::Medium,
            related: RelatedEntity::FixedPayment(payment_id),
            payload: NotificationPayload::FixedPaymentOverdue {
                payment_id,
                payment_name: "Kira".into(),
                amount: 5000.0,
                due_date: date(2026, 9, 1),
                days_overdue: days,
            },
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_second_open_overdue_row() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let payment = Uuid::new_v4();

        let first = store
            .insert(&overdue_candidate(user, payment, 2), date(2026, 9, 3))
            .await
            .unwrap();
        assert!(first.is_some());

        let second = store
            .insert(&overdue_candidate(user, payment, 3), date(2026, 9, 4))
            .await
            .unwrap();
        assert!(second.is_none());
        assert_eq!(store.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_dismissed_row_frees_the_key() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let payment = Uuid::new_v4();

        let first = store
            .insert(&overdue_candidate(user, payment, 2), date(2026, 9, 3))
            .await
            .unwrap()
            .unwrap();
        store.dismiss(first.id);

        let found = store
            .find_open(user, NotificationType::FixedPaymentOverdue, &first.related_key)
            .await
            .unwrap();
        assert!(found.is_none());
        assert!(
            store
                .insert(&overdue_candidate(user, payment, 3), date(2026, 9, 4))
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_monthly_expenses_groups_by_category() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        store.add_expense(user, "Ulaşım", date(2026, 9, 2), 300.0);
        store.add_expense(user, "Ulaşım", date(2026, 9, 20), 200.0);
        store.add_expense(user, "Ulaşım", date(2026, 8, 31), 999.0);
        store.add_expense(user, "Eğlence", date(2026, 9, 5), 50.0);

        let totals = store.monthly_expenses(user, 2026, 9).await.unwrap();
        let transport = totals.iter().find(|t| t.category == "Ulaşım").unwrap();
        assert_eq!(transport.total, 500.0);
        assert_eq!(totals.len(), 2);
    }

    #[tokio::test]
    async fn test_failing_user_reads_error() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        store.fail_finance_for(user);
        assert!(store.fixed_payments(user).await.is_err());
        assert!(store.fixed_payments(Uuid::new_v4()).await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_only_from_queued() {
        let store = MemoryStore::new();
        let attempt = store
            .record(&NewDeliveryAttempt {
                user_id: None,
                email_type: EmailType::Test,
                recipient_email: "a@b.co".into(),
                subject: "Test".into(),
                retry_count: 0,
            })
            .await
            .unwrap();
        assert_eq!(attempt.status, DeliveryStatus::Queued);

        let failed = store
            .resolve(attempt.id, &DeliveryResolution::Failed { error: "boom".into() })
            .await
            .unwrap();
        assert_eq!(failed.status, DeliveryStatus::Failed);
        assert!(failed.sent_at.is_none());

        let again = store
            .resolve(
                attempt.id,
                &DeliveryResolution::Sent {
                    message_id: "m1".into(),
                },
            )
            .await;
        assert!(again.is_err());

        let stats = store.stats(&DeliveryStatsFilter::default()).await.unwrap();
        assert_eq!(stats.totals.failed, 1);
        assert_eq!(store.recent_failures(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_by_user_returns_newest_first_up_to_limit() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        for (owner, retry_count) in [(user, 0), (other, 0), (user, 1), (user, 2)] {
            store
                .record(&NewDeliveryAttempt {
                    user_id: Some(owner),
                    email_type: EmailType::CriticalAlert,
                    recipient_email: "ayse@example.com".into(),
                    subject: "Ödeme Gecikti".into(),
                    retry_count,
                })
                .await
                .unwrap();
        }

        let latest = store.by_user(user, 2).await.unwrap();
        let retries: Vec<i32> = latest.iter().map(|a| a.retry_count).collect();
        assert_eq!(retries, vec![2, 1]);
        assert!(latest.iter().all(|a| a.user_id == Some(user)));

        assert_eq!(store.by_user(user, 10).await.unwrap().len(), 3);
        assert_eq!(store.by_user(other, 10).await.unwrap().len(), 1);
        assert!(store.by_user(user, 0).await.unwrap().is_empty());
    }
}
