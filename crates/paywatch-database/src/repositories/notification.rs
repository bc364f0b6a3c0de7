//! Notification repository implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use paywatch_core::error::{AppError, ErrorKind};
use paywatch_core::result::AppResult;
use paywatch_entity::notification::{
    NewNotification, Notification, NotificationType, NotificationUpdate,
};

use crate::store::NotificationStore;

/// Repository over the `smart_notifications` table.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn find_open_on(
        &self,
        user_id: Uuid,
        notification_type: NotificationType,
        related_key: &str,
        day: NaiveDate,
    ) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM smart_notifications \
             WHERE user_id = $1 AND notification_type = $2 AND related_key = $3 \
               AND created_on = $4 AND is_dismissed = FALSE \
             LIMIT 1",
        )
        .bind(user_id)
        .bind(notification_type)
        .bind(related_key)
        .bind(day)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to look up notification", e)
        })
    }

    async fn find_open(
        &self,
        user_id: Uuid,
        notification_type: NotificationType,
        related_key: &str,
    ) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM smart_notifications \
             WHERE user_id = $1 AND notification_type = $2 AND related_key = $3 \
               AND is_dismissed = FALSE \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .bind(notification_type)
        .bind(related_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to look up open notification", e)
        })
    }

    async fn insert(
        &self,
        notification: &NewNotification,
        created_on: NaiveDate,
    ) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO smart_notifications \
             (id, user_id, notification_type, title, message, priority, \
              related_entity_type, related_entity_id, related_key, payload, created_on) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT DO NOTHING \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(notification.user_id)
        .bind(notification.notification_type)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.priority)
        .bind(notification.related.entity_type())
        .bind(notification.related.entity_id())
        .bind(notification.related.key())
        .bind(Json(&notification.payload))
        .bind(created_on)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert notification", e))
    }

    async fn update_in_place(
        &self,
        id: Uuid,
        update: &NotificationUpdate,
    ) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "UPDATE smart_notifications \
             SET title = $2, message = $3, priority = $4, payload = $5, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.message)
        .bind(update.priority)
        .bind(Json(&update.payload))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update notification", e))?
        .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))
    }

    async fn list_open_unread(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM smart_notifications \
             WHERE user_id = $1 AND is_dismissed = FALSE AND is_read = FALSE \
             ORDER BY priority DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list notifications", e))
    }
}
