//! Run a daily job once.

use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use paywatch_core::error::AppError;
use paywatch_worker::{BatchReport, DigestReport, RunContext};

/// Which job to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum JobKind {
    /// Generate notifications for every active user
    Notifications,
    /// Email the daily digest
    Digest,
}

/// Arguments for the run-once command
#[derive(Debug, Args)]
pub struct RunOnceArgs {
    /// Job to run
    #[arg(short, long, value_enum, default_value = "notifications")]
    pub job: JobKind,
    /// Run even if this date was already completed
    #[arg(long)]
    pub force: bool,
    /// Date to evaluate (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

/// Failed user row
#[derive(Debug, Serialize, Tabled)]
struct FailureRow {
    user: String,
    error: String,
}

/// Execute the run-once command
pub async fn execute(
    args: &RunOnceArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (runtime, db) = super::build_runtime(config_path).await?;
    let ctx = match args.date {
        Some(date) => RunContext::for_date(date, args.force),
        None => RunContext {
            force: args.force,
            ..RunContext::scheduled()
        },
    };

    let outcome = match args.job {
        JobKind::Notifications => runtime
            .notifications_job
            .run_daily(ctx)
            .await
            .map(|report| print_batch(&report, format)),
        JobKind::Digest => runtime
            .digest_job
            .run_digest(ctx)
            .await
            .map(|report| print_digest(&report, format)),
    };
    db.close().await;

    outcome.map_err(|e| AppError::internal(format!("Job did not complete: {e}")))
}

fn print_batch(report: &BatchReport, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json(report);
        return;
    }

    println!("Daily notifications for {}:", output::or_dash(report.run_date));
    output::print_kv("Users", &report.users_total.to_string());
    output::print_kv("Processed", &report.users_processed.to_string());
    output::print_kv("Failed", &report.users_failed.to_string());
    output::print_kv("Created", &report.created.to_string());
    output::print_kv("Updated", &report.updated.to_string());
    output::print_kv("Skipped", &report.skipped.to_string());
    output::print_kv("Alerts sent", &report.alerts_sent.to_string());
    output::print_kv("Duration", &format!("{} ms", report.duration_ms));
    print_failures(report.failures.iter().map(|f| (f.user_id, f.error.as_str())));
}

fn print_digest(report: &DigestReport, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json(report);
        return;
    }

    println!("Daily digest:");
    output::print_kv("Recipients", &report.recipients.to_string());
    output::print_kv("Sent", &report.sent.to_string());
    output::print_kv("Nothing to send", &report.empty.to_string());
    output::print_kv("Failed", &report.failed.to_string());
    if report.aborted_by_breaker {
        output::print_warning("Stopped early: circuit breaker open");
    }
    print_failures(report.failures.iter().map(|f| (f.user_id, f.error.as_str())));
}

fn print_failures<'a>(failures: impl Iterator<Item = (uuid::Uuid, &'a str)>) {
    let rows: Vec<FailureRow> = failures
        .map(|(user, error)| FailureRow {
            user: user.to_string(),
            error: error.to_string(),
        })
        .collect();
    if !rows.is_empty() {
        println!();
        output::print_list(&rows, OutputFormat::Table);
    }
}
