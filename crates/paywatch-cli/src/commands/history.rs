//! Delivery history for one user.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use paywatch_core::error::AppError;
use paywatch_database::DeliveryLogStore;
use paywatch_database::repositories::DeliveryLogRepository;

/// Arguments for the history command
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// User whose emails to list
    #[arg(long)]
    pub user: Uuid,
    /// Number of results, newest first
    #[arg(short, long, default_value = "20")]
    pub limit: i64,
}

/// One delivery attempt
#[derive(Debug, Serialize, Tabled)]
struct HistoryRow {
    time: String,
    email_type: String,
    status: String,
    subject: String,
    retry: i32,
    message_id: String,
}

/// Execute the history command
pub async fn execute(
    args: &HistoryArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    if args.limit <= 0 {
        return Err(AppError::validation("--limit must be positive"));
    }

    let config = super::load_config(config_path)?;
    let db = super::connect(&config).await?;
    let repo = DeliveryLogRepository::new(db.pool().clone());

    let attempts = repo.by_user(args.user, args.limit).await?;
    db.close().await;

    if attempts.is_empty() && format == OutputFormat::Table {
        output::print_warning(&format!("No emails recorded for user {}", args.user));
        return Ok(());
    }

    let rows: Vec<HistoryRow> = attempts
        .into_iter()
        .map(|a| HistoryRow {
            time: a.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            email_type: a.email_type,
            status: a.status.to_string(),
            subject: a.subject,
            retry: a.retry_count,
            message_id: output::or_dash(a.provider_message_id),
        })
        .collect();

    output::print_list(&rows, format);
    Ok(())
}
