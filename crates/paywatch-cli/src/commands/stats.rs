//! Email delivery statistics.

use chrono::{Duration, Utc};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use paywatch_core::error::AppError;
use paywatch_database::DeliveryLogStore;
use paywatch_database::repositories::DeliveryLogRepository;
use paywatch_entity::delivery::DeliveryStatsFilter;

/// Arguments for the stats command
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Restrict to one user
    #[arg(long)]
    pub user: Option<Uuid>,
    /// Only count attempts from the last N days
    #[arg(long)]
    pub days: Option<i64>,
}

/// Per-type display row
#[derive(Debug, Serialize, Tabled)]
struct TypeRow {
    email_type: String,
    total: i64,
    sent: i64,
    failed: i64,
    bounced: i64,
    queued: i64,
}

/// Execute the stats command
pub async fn execute(args: &StatsArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::connect(&config).await?;
    let repo = DeliveryLogRepository::new(db.pool().clone());

    let filter = DeliveryStatsFilter {
        user_id: args.user,
        from: args.days.map(|d| Utc::now() - Duration::days(d)),
        to: None,
    };
    let stats = repo.stats(&filter).await?;
    db.close().await;

    if format == OutputFormat::Json {
        output::print_json(&stats);
        return Ok(());
    }

    println!("Email delivery:");
    output::print_kv("Total", &stats.totals.total.to_string());
    output::print_kv("Sent", &stats.totals.sent.to_string());
    output::print_kv("Failed", &stats.totals.failed.to_string());
    output::print_kv("Bounced", &stats.totals.bounced.to_string());
    output::print_kv("Queued", &stats.totals.queued.to_string());
    output::print_kv("Success rate", &format!("{:.2}%", stats.success_rate));
    println!();

    let rows: Vec<TypeRow> = stats
        .by_type
        .into_iter()
        .map(|t| TypeRow {
            email_type: t.email_type,
            total: t.total,
            sent: t.sent,
            failed: t.failed,
            bounced: t.bounced,
            queued: t.queued,
        })
        .collect();
    output::print_list(&rows, format);
    Ok(())
}
