//! CLI command definitions and dispatch.

pub mod failures;
pub mod history;
pub mod migrate;
pub mod overdue;
pub mod run;
pub mod send_test;
pub mod serve;
pub mod stats;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use paywatch_core::config::AppConfig;
use paywatch_core::error::AppError;
use paywatch_database::{DatabasePool, Stores};
use paywatch_worker::WorkerRuntime;

/// PayWatch: payment reminders, overdue detection and email alerts
#[derive(Debug, Parser)]
#[command(name = "paywatch", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the scheduler until interrupted
    Serve,
    /// Run a daily job once and print its report
    RunOnce(run::RunOnceArgs),
    /// Send a test email through the configured provider
    SendTest(send_test::SendTestArgs),
    /// Email delivery statistics
    Stats(stats::StatsArgs),
    /// Most recent failed deliveries
    Failures(failures::FailuresArgs),
    /// Most recent emails sent to one user
    History(history::HistoryArgs),
    /// Show what is overdue for a user without writing anything
    Overdue(overdue::OverdueArgs),
    /// Apply pending database migrations
    Migrate,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve => serve::execute(&self.config).await,
            Commands::RunOnce(args) => run::execute(args, &self.config, self.format).await,
            Commands::SendTest(args) => send_test::execute(args, &self.config, self.format).await,
            Commands::Stats(args) => stats::execute(args, &self.config, self.format).await,
            Commands::Failures(args) => failures::execute(args, &self.config, self.format).await,
            Commands::History(args) => history::execute(args, &self.config, self.format).await,
            Commands::Overdue(args) => overdue::execute(args, &self.config, self.format).await,
            Commands::Migrate => migrate::execute(&self.config).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_file(config_path)
}

/// Helper: connect to the database configured in `config`
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: wire the worker runtime over PostgreSQL
pub async fn build_runtime(config_path: &str) -> Result<(WorkerRuntime, DatabasePool), AppError> {
    let config = load_config(config_path)?;
    let db = connect(&config).await?;
    let runtime = WorkerRuntime::from_config(config, Stores::postgres(db.pool()))?;
    Ok((runtime, db))
}
