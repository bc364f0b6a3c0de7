//! Store traits at the seam between the pipeline and persistence.
//!
//! The notification pipeline and the email dispatcher depend only on these
//! traits; [`crate::repositories`] implements them over PostgreSQL and
//! [`crate::memory`] implements them in process.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use paywatch_core::result::AppResult;
use paywatch_entity::delivery::{
    DeliveryAttempt, DeliveryResolution, DeliveryStats, DeliveryStatsFilter, NewDeliveryAttempt,
};
use paywatch_entity::finance::{CategorySpending, CreditCard, FixedPayment, InstallmentPlan};
use paywatch_entity::notification::{
    NewNotification, Notification, NotificationType, NotificationUpdate,
};
use paywatch_entity::recipient::Recipient;

use crate::memory::MemoryStore;
use crate::repositories::{
    DeliveryLogRepository, FinanceRepository, NotificationRepository, UserRepository,
};

/// Source of users the daily batch iterates.
#[async_trait]
pub trait UserSource: Send + Sync + std::fmt::Debug + 'static {
    /// Ids of every user flagged active.
    async fn active_user_ids(&self) -> AppResult<Vec<Uuid>>;
}

/// Read-only access to a user's financial entities.
#[async_trait]
pub trait FinanceSource: Send + Sync + std::fmt::Debug + 'static {
    /// Active fixed payments.
    async fn fixed_payments(&self, user_id: Uuid) -> AppResult<Vec<FixedPayment>>;

    /// Active credit cards.
    async fn credit_cards(&self, user_id: Uuid) -> AppResult<Vec<CreditCard>>;

    /// Active installment plans.
    async fn installment_plans(&self, user_id: Uuid) -> AppResult<Vec<InstallmentPlan>>;

    /// Expense totals per category for one calendar month.
    async fn monthly_expenses(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> AppResult<Vec<CategorySpending>>;
}

/// Persistence for notifications, keyed by (user, type, related key).
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Open notification for the key created on `day`.
    async fn find_open_on(
        &self,
        user_id: Uuid,
        notification_type: NotificationType,
        related_key: &str,
        day: NaiveDate,
    ) -> AppResult<Option<Notification>>;

    /// Open notification for the key, whatever its creation date.
    async fn find_open(
        &self,
        user_id: Uuid,
        notification_type: NotificationType,
        related_key: &str,
    ) -> AppResult<Option<Notification>>;

    /// Insert a notification dated `created_on`.
    ///
    /// Returns `None` when a uniqueness backstop rejected the row because an
    /// equivalent open notification already exists.
    async fn insert(
        &self,
        notification: &NewNotification,
        created_on: NaiveDate,
    ) -> AppResult<Option<Notification>>;

    /// Rewrite title, message, priority and payload of an existing row and
    /// refresh its `updated_at`.
    async fn update_in_place(
        &self,
        id: Uuid,
        update: &NotificationUpdate,
    ) -> AppResult<Notification>;

    /// Open, unread notifications for a user, newest first.
    async fn list_open_unread(&self, user_id: Uuid) -> AppResult<Vec<Notification>>;
}

/// Append-only log of email delivery attempts.
#[async_trait]
pub trait DeliveryLogStore: Send + Sync + std::fmt::Debug + 'static {
    /// Record a new attempt with status `queued`.
    async fn record(&self, attempt: &NewDeliveryAttempt) -> AppResult<DeliveryAttempt>;

    /// Resolve a queued attempt to `sent` or `failed`.
    ///
    /// Fails with a conflict when the attempt is no longer queued.
    async fn resolve(
        &self,
        id: Uuid,
        resolution: &DeliveryResolution,
    ) -> AppResult<DeliveryAttempt>;

    /// Most recent attempts for a user.
    async fn by_user(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<DeliveryAttempt>>;

    /// Aggregate counts.
    async fn stats(&self, filter: &DeliveryStatsFilter) -> AppResult<DeliveryStats>;

    /// Most recent failed attempts.
    async fn recent_failures(&self, limit: i64) -> AppResult<Vec<DeliveryAttempt>>;
}

/// Email addresses and preferences of users.
#[async_trait]
pub trait RecipientSource: Send + Sync + std::fmt::Debug + 'static {
    /// One user's recipient record, if they have an address.
    async fn recipient(&self, user_id: Uuid) -> AppResult<Option<Recipient>>;

    /// Active users with email and the daily digest enabled.
    async fn digest_recipients(&self) -> AppResult<Vec<Recipient>>;
}

/// Every store the pipeline needs, behind trait objects.
#[derive(Debug, Clone)]
pub struct Stores {
    pub users: Arc<dyn UserSource>,
    pub finance: Arc<dyn FinanceSource>,
    pub notifications: Arc<dyn NotificationStore>,
    pub delivery_log: Arc<dyn DeliveryLogStore>,
    pub recipients: Arc<dyn RecipientSource>,
}

impl Stores {
    /// PostgreSQL repositories sharing one pool.
    pub fn postgres(pool: &PgPool) -> Self {
        let users = Arc::new(UserRepository::new(pool.clone()));
        Self {
            users: users.clone(),
            finance: Arc::new(FinanceRepository::new(pool.clone())),
            notifications: Arc::new(NotificationRepository::new(pool.clone())),
            delivery_log: Arc::new(DeliveryLogRepository::new(pool.clone())),
            recipients: users,
        }
    }

    /// One in-memory store serving every role.
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            finance: store.clone(),
            notifications: store.clone(),
            delivery_log: store.clone(),
            recipients: store,
        }
    }
}
