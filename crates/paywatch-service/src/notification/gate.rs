//! Dedup & Persistence Gate.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use paywatch_core::result::AppResult;
use paywatch_database::NotificationStore;
use paywatch_entity::notification::{NewNotification, Notification};

/// What the gate did with a candidate.
#[derive(Debug, Clone)]
pub enum AdmitOutcome {
    /// Stored as a new notification.
    Created(Notification),
    /// An open overdue notification was refreshed in place.
    Updated(Notification),
    /// An equivalent open notification already exists.
    Skipped,
}

impl AdmitOutcome {
    /// The stored row, unless skipped.
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            Self::Created(n) | Self::Updated(n) => Some(n),
            Self::Skipped => None,
        }
    }
}

/// Enforces at most one open notification per key.
///
/// Dated types are keyed by (user, type, related entity, day); overdue
/// types by (user, type, related entity) alone and are updated in place
/// while the condition lasts. The store's uniqueness backstop turns a lost
/// insert race into a skip or an update instead of a duplicate.
#[derive(Debug, Clone)]
pub struct DedupGate {
    store: Arc<dyn NotificationStore>,
}

impl DedupGate {
    /// Create a gate over a notification store.
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Admit one candidate detected on `today`.
    pub async fn admit(&self, candidate: &NewNotification, today: NaiveDate) -> AppResult<AdmitOutcome> {
        if candidate.notification_type.is_overdue() {
            self.admit_ongoing(candidate, today).await
        } else {
            self.admit_daily(candidate, today).await
        }
    }

    async fn admit_daily(&self, candidate: &NewNotification, today: NaiveDate) -> AppResult<AdmitOutcome> {
        let key = candidate.related.key();
        if self
            .store
            .find_open_on(candidate.user_id, candidate.notification_type, &key, today)
            .await?
            .is_some()
        {
            debug!(
                user_id = %candidate.user_id,
                notification_type = %candidate.notification_type,
                related_key = %key,
                "Duplicate notification skipped"
            );
            return Ok(AdmitOutcome::Skipped);
        }

        match self.store.insert(candidate, today).await? {
            Some(created) => {
                debug!(
                    notification_id = %created.id,
                    user_id = %candidate.user_id,
                    notification_type = %candidate.notification_type,
                    "Notification created"
                );
                Ok(AdmitOutcome::Created(created))
            }
            None => {
                debug!(
                    user_id = %candidate.user_id,
                    related_key = %key,
                    "Notification insert lost to a concurrent duplicate"
                );
                Ok(AdmitOutcome::Skipped)
            }
        }
    }

    async fn admit_ongoing(&self, candidate: &NewNotification, today: NaiveDate) -> AppResult<AdmitOutcome> {
        let key = candidate.related.key();

        if let Some(existing) = self
            .store
            .find_open(candidate.user_id, candidate.notification_type, &key)
            .await?
        {
            return self.refresh(existing, candidate).await;
        }

        if let Some(created) = self.store.insert(candidate, today).await? {
            debug!(
                notification_id = %created.id,
                user_id = %candidate.user_id,
                notification_type = %candidate.notification_type,
                "Overdue notification created"
            );
            return Ok(AdmitOutcome::Created(created));
        }

        // Another writer inserted the row between our read and insert.
        match self
            .store
            .find_open(candidate.user_id, candidate.notification_type, &key)
            .await?
        {
            Some(existing) => self.refresh(existing, candidate).await,
            None => Ok(AdmitOutcome::Skipped),
        }
    }

    async fn refresh(&self, existing: Notification, candidate: &NewNotification) -> AppResult<AdmitOutcome> {
        let updated = self
            .store
            .update_in_place(existing.id, &candidate.as_update())
            .await?;
        debug!(
            notification_id = %updated.id,
            user_id = %candidate.user_id,
            notification_type = %candidate.notification_type,
            days_overdue = ?candidate.payload.days_overdue(),
            "Overdue notification updated"
        );
        Ok(AdmitOutcome::Updated(updated))
    }
}
