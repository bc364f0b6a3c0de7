//! Run the scheduler in the foreground.

use crate::output;
use paywatch_core::error::AppError;

/// Execute the serve command
pub async fn execute(config_path: &str) -> Result<(), AppError> {
    let (runtime, db) = super::build_runtime(config_path).await?;

    println!("Running database migrations...");
    paywatch_database::migration::run_migrations(db.pool()).await?;

    let Some(mut scheduler) = runtime.start_scheduler().await? else {
        output::print_warning("Scheduler is disabled in configuration; nothing to run.");
        return Ok(());
    };

    println!("Scheduler running. Jobs: {}", runtime.executor.registered().join(", "));
    println!("Press Ctrl+C to stop.");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::internal(format!("Failed to listen for Ctrl+C: {e}")))?;

    scheduler.shutdown().await?;
    db.close().await;
    output::print_success("Scheduler stopped.");
    Ok(())
}
