//! Recent failed deliveries.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use paywatch_core::error::AppError;
use paywatch_database::DeliveryLogStore;
use paywatch_database::repositories::DeliveryLogRepository;

/// Arguments for the failures command
#[derive(Debug, Args)]
pub struct FailuresArgs {
    /// Number of results
    #[arg(short, long, default_value = "20")]
    pub limit: i64,
}

/// Failed delivery row
#[derive(Debug, Serialize, Tabled)]
struct FailureRow {
    time: String,
    user: String,
    email_type: String,
    recipient: String,
    retry: i32,
    error: String,
}

/// Execute the failures command
pub async fn execute(
    args: &FailuresArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::connect(&config).await?;
    let repo = DeliveryLogRepository::new(db.pool().clone());

    let failures = repo.recent_failures(args.limit).await?;
    db.close().await;

    let rows: Vec<FailureRow> = failures
        .into_iter()
        .map(|a| FailureRow {
            time: a.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            user: output::or_dash(a.user_id),
            email_type: a.email_type,
            recipient: a.recipient_email,
            retry: a.retry_count,
            error: a.error_message.unwrap_or_default(),
        })
        .collect();

    output::print_list(&rows, format);
    Ok(())
}
