//! Read-only overdue check for a single user.

use chrono::{Local, NaiveDate};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use paywatch_core::error::AppError;
use paywatch_database::Stores;
use paywatch_service::OverdueDetector;

/// Arguments for the overdue command
#[derive(Debug, Args)]
pub struct OverdueArgs {
    /// User to check
    #[arg(long)]
    pub user: Uuid,
    /// Date to evaluate (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

/// Overdue display row
#[derive(Debug, Serialize, Tabled)]
struct OverdueRow {
    kind: &'static str,
    name: String,
    amount: String,
    due_date: NaiveDate,
    days_overdue: i64,
    priority: String,
}

/// Execute the overdue command
pub async fn execute(args: &OverdueArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::connect(&config).await?;
    let stores = Stores::postgres(db.pool());
    let today = args.date.unwrap_or_else(|| Local::now().date_naive());

    let report = OverdueDetector::from_config(&config.rules)
        .detect(&stores.finance, args.user, today)
        .await?;
    db.close().await;

    if format == OutputFormat::Json {
        output::print_json(&report);
        return Ok(());
    }

    let mut rows = Vec::with_capacity(report.len());
    rows.extend(report.fixed_payments.iter().map(|i| OverdueRow {
        kind: "fixed_payment",
        name: i.entity.name.clone(),
        amount: format!("{:.2}", i.entity.amount),
        due_date: i.due_date,
        days_overdue: i.days_overdue,
        priority: i.priority.to_string(),
    }));
    rows.extend(report.credit_cards.iter().map(|i| OverdueRow {
        kind: "credit_card",
        name: i.entity.name.clone(),
        amount: format!("{:.2}", i.entity.minimum_payment()),
        due_date: i.due_date,
        days_overdue: i.days_overdue,
        priority: i.priority.to_string(),
    }));
    rows.extend(report.installments.iter().map(|i| OverdueRow {
        kind: "installment",
        name: i.entity.item_name.clone(),
        amount: format!("{:.2}", i.entity.installment_amount),
        due_date: i.due_date,
        days_overdue: i.days_overdue,
        priority: i.priority.to_string(),
    }));

    println!("Overdue for {} on {}:", args.user, today);
    output::print_list(&rows, format);
    Ok(())
}
