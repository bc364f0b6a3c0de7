//! Database migration command.

use crate::output;
use paywatch_core::error::AppError;

/// Execute the migrate command
pub async fn execute(config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::connect(&config).await?;

    println!("Running database migrations...");
    let known = paywatch_database::migration::run_migrations(db.pool()).await?;
    output::print_success(&format!(
        "Schema up to date ({known} migrations; tables: {}).",
        paywatch_database::migration::OWNED_TABLES.join(", ")
    ));

    db.close().await;
    Ok(())
}
