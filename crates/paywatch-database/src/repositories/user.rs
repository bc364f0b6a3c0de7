//! User and recipient repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use paywatch_core::error::{AppError, ErrorKind};
use paywatch_core::result::AppResult;
use paywatch_entity::recipient::Recipient;

use crate::store::{RecipientSource, UserSource};

const RECIPIENT_SELECT: &str = "SELECT u.id AS user_id, u.email, u.name, \
     COALESCE(p.language, 'tr') AS language, \
     COALESCE(p.email_enabled, TRUE) AS email_enabled, \
     COALESCE(p.daily_digest_enabled, TRUE) AS daily_digest_enabled, \
     COALESCE(p.critical_alerts_enabled, TRUE) AS critical_alerts_enabled \
     FROM users u LEFT JOIN user_email_preferences p ON p.user_id = u.id";

/// Read-only access to the `users` and `user_email_preferences` tables.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserSource for UserRepository {
    async fn active_user_ids(&self) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE is_active = TRUE")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list active users", e))
    }
}

#[async_trait]
impl RecipientSource for UserRepository {
    async fn recipient(&self, user_id: Uuid) -> AppResult<Option<Recipient>> {
        sqlx::query_as::<_, Recipient>(&format!(
            "{RECIPIENT_SELECT} WHERE u.id = $1 AND u.email IS NOT NULL"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load recipient", e))
    }

    async fn digest_recipients(&self) -> AppResult<Vec<Recipient>> {
        sqlx::query_as::<_, Recipient>(&format!(
            "{RECIPIENT_SELECT} WHERE u.is_active = TRUE AND u.email IS NOT NULL \
             AND COALESCE(p.email_enabled, TRUE) AND COALESCE(p.daily_digest_enabled, TRUE) \
             ORDER BY u.id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list digest recipients", e)
        })
    }
}
