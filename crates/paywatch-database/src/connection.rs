//! PostgreSQL pool shared by the notification stores and the delivery log.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use paywatch_core::config::DatabaseConfig;
use paywatch_core::error::{AppError, ErrorKind};

/// Point-in-time pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Open connections, idle or in use.
    pub size: u32,
    /// Connections waiting in the pool.
    pub idle: usize,
}

/// Owns the sqlx pool the PostgreSQL stores borrow from.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open the pool and make sure the server answers before any job runs.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let target = redact_url(&config.url);
        info!(url = %target, "Connecting to PostgreSQL");

        let pool = pool_options(config)
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to database at {target}: {e}"),
                    e,
                )
            })?;

        let db = Self { pool };
        db.health_check().await?;
        let status = db.status();
        info!(
            url = %target,
            open = status.size,
            max_connections = config.max_connections,
            "PostgreSQL ready"
        );
        Ok(db)
    }

    /// Borrow the sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial query; fails if the server is unreachable.
    pub async fn health_check(&self) -> Result<(), AppError> {
        let one = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Database health check failed", e))?;
        if one != 1 {
            return Err(AppError::database(format!(
                "Database health check returned {one}"
            )));
        }
        Ok(())
    }

    /// Current pool occupancy.
    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
        }
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        let status = self.status();
        if status.size as usize > status.idle {
            warn!(
                busy = status.size as usize - status.idle,
                "Closing database pool with connections still in use"
            );
        }
        self.pool.close().await;
        info!("Database pool closed");
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
}

/// Hide the password of a connection URL. The last `@` ends the userinfo.
fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((userinfo, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:****@{host}"),
        None => url.to_string(),
    }
}
