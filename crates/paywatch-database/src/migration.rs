//! Schema migrations for the notification and delivery-log tables.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use paywatch_core::error::{AppError, ErrorKind};

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Tables this service owns. Users, bills and budgets belong to the main app.
pub const OWNED_TABLES: [&str; 2] = ["smart_notifications", "email_delivery_log"];

/// Apply pending migrations, then confirm the owned tables exist.
///
/// Returns the number of migrations known to this build.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, AppError> {
    let known = MIGRATOR.iter().count();
    info!(migrations = known, "Applying schema migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    let missing = missing_tables(pool).await?;
    if !missing.is_empty() {
        return Err(AppError::database(format!(
            "Schema incomplete after migrations, missing tables: {}",
            missing.join(", ")
        )));
    }

    info!(migrations = known, tables = ?OWNED_TABLES, "Schema up to date");
    Ok(known)
}

async fn missing_tables(pool: &PgPool) -> Result<Vec<String>, AppError> {
    let wanted: Vec<String> = OWNED_TABLES.iter().map(|t| t.to_string()).collect();
    let present: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::text FROM information_schema.tables \
         WHERE table_schema = current_schema() AND table_name = ANY($1)",
    )
    .bind(&wanted)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to inspect schema", e))?;

    Ok(wanted
        .into_iter()
        .filter(|t| !present.contains(t))
        .collect())
}
