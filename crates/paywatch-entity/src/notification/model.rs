//! Notification entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use super::{NotificationPayload, NotificationPriority, NotificationType, RelatedEntity};

/// A stored notification (`smart_notifications` row).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The recipient user.
    pub user_id: Uuid,
    /// What condition this reports.
    pub notification_type: NotificationType,
    /// Short title.
    pub title: String,
    /// Localized body text.
    pub message: String,
    /// Priority level.
    pub priority: NotificationPriority,
    /// `fixed_payment`, `credit_card`, `installment_payment` or `budget`.
    pub related_entity_type: Option<String>,
    /// Row id of the related entity (null for budgets).
    pub related_entity_id: Option<Uuid>,
    /// Deduplication key (see [`RelatedEntity::key`]).
    pub related_key: String,
    /// Type-specific structured data.
    pub payload: Json<NotificationPayload>,
    /// Whether the user has read this notification.
    pub is_read: bool,
    /// Whether the user dismissed this notification.
    pub is_dismissed: bool,
    /// Calendar date the notification was created for.
    pub created_on: NaiveDate,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last refreshed.
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    /// Open notifications have not been dismissed.
    pub fn is_open(&self) -> bool {
        !self.is_dismissed
    }

    /// Check if the notification has been read.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }
}

/// A candidate notification produced by a rule evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    /// The recipient user.
    pub user_id: Uuid,
    /// What condition this reports.
    pub notification_type: NotificationType,
    /// Short title.
    pub title: String,
    /// Localized body text.
    pub message: String,
    /// Priority level.
    pub priority: NotificationPriority,
    /// Entity the condition is about.
    pub related: RelatedEntity,
    /// Type-specific structured data.
    pub payload: NotificationPayload,
}

impl NewNotification {
    /// The refresh applied when an open overdue notification is re-detected.
    pub fn as_update(&self) -> NotificationUpdate {
        NotificationUpdate {
            title: self.title.clone(),
            message: self.message.clone(),
            priority: self.priority,
            payload: self.payload.clone(),
        }
    }
}

/// Fields rewritten on an in-place update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationUpdate {
    /// New title.
    pub title: String,
    /// New body text.
    pub message: String,
    /// New priority.
    pub priority: NotificationPriority,
    /// New payload.
    pub payload: NotificationPayload,
}
