//! Email delivery log repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use paywatch_core::error::{AppError, ErrorKind};
use paywatch_core::result::AppResult;
use paywatch_entity::delivery::{
    DeliveryAttempt, DeliveryResolution, DeliveryStats, DeliveryStatsFilter, DeliveryStatus,
    NewDeliveryAttempt, TypeDeliveryStats,
};

use crate::store::DeliveryLogStore;

/// Repository over the `email_delivery_log` table.
#[derive(Debug, Clone)]
pub struct DeliveryLogRepository {
    pool: PgPool,
}

impl DeliveryLogRepository {
    /// Create a new delivery log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeliveryLogStore for DeliveryLogRepository {
    async fn record(&self, attempt: &NewDeliveryAttempt) -> AppResult<DeliveryAttempt> {
        sqlx::query_as::<_, DeliveryAttempt>(
            "INSERT INTO email_delivery_log \
             (id, user_id, email_type, recipient_email, subject, status, retry_count) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(attempt.user_id)
        .bind(attempt.email_type.as_str())
        .bind(&attempt.recipient_email)
        .bind(&attempt.subject)
        .bind(DeliveryStatus::Queued)
        .bind(attempt.retry_count)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record delivery attempt", e)
        })
    }

    async fn resolve(
        &self,
        id: Uuid,
        resolution: &DeliveryResolution,
    ) -> AppResult<DeliveryAttempt> {
        let (message_id, error) = match resolution {
            DeliveryResolution::Sent { message_id } => (Some(message_id.as_str()), None),
            DeliveryResolution::Failed { error } => (None, Some(error.as_str())),
        };

        // Only queued rows move; anything else is left untouched.
        sqlx::query_as::<_, DeliveryAttempt>(
            "UPDATE email_delivery_log \
             SET status = $2, provider_message_id = $3, error_message = $4, \
                 sent_at = CASE WHEN $2 = 'sent'::delivery_status THEN NOW() ELSE NULL END \
             WHERE id = $1 AND status = 'queued' \
             RETURNING *",
        )
        .bind(id)
        .bind(resolution.status())
        .bind(message_id)
        .bind(error)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to resolve delivery attempt", e)
        })?
        .ok_or_else(|| AppError::conflict(format!("Delivery attempt {id} is not queued")))
    }

    async fn by_user(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<DeliveryAttempt>> {
        sqlx::query_as::<_, DeliveryAttempt>(
            "SELECT * FROM email_delivery_log WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list delivery attempts", e)
        })
    }

    async fn stats(&self, filter: &DeliveryStatsFilter) -> AppResult<DeliveryStats> {
        let by_type = sqlx::query_as::<_, TypeDeliveryStats>(
            "SELECT email_type, \
                    COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE status = 'sent') AS sent, \
                    COUNT(*) FILTER (WHERE status = 'failed') AS failed, \
                    COUNT(*) FILTER (WHERE status = 'bounced') AS bounced, \
                    COUNT(*) FILTER (WHERE status = 'queued') AS queued \
             FROM email_delivery_log \
             WHERE ($1::uuid IS NULL OR user_id = $1) \
               AND ($2::timestamptz IS NULL OR created_at >= $2) \
               AND ($3::timestamptz IS NULL OR created_at <= $3) \
             GROUP BY email_type \
             ORDER BY email_type",
        )
        .bind(filter.user_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to aggregate delivery stats", e)
        })?;

        Ok(DeliveryStats::from_by_type(by_type))
    }

    async fn recent_failures(&self, limit: i64) -> AppResult<Vec<DeliveryAttempt>> {
        sqlx::query_as::<_, DeliveryAttempt>(
            "SELECT * FROM email_delivery_log WHERE status = 'failed' \
             ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list recent failures", e)
        })
    }
}
