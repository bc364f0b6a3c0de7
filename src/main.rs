//! PayWatch server: runs the daily notification and digest jobs on a schedule.

use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use paywatch_core::config::AppConfig;
use paywatch_core::error::AppError;
use paywatch_database::{DatabasePool, Stores};
use paywatch_worker::WorkerRuntime;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the environment overlay and `PAYWATCH__*` variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("PAYWATCH_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting PayWatch v{}", env!("CARGO_PKG_VERSION"));

    let db = DatabasePool::connect(&config.database).await?;
    let migrations = paywatch_database::migration::run_migrations(db.pool()).await?;
    tracing::info!(migrations, "Database schema ready");

    let runtime = WorkerRuntime::from_config(config, Stores::postgres(db.pool()))?;
    let health = runtime.dispatcher.health().await;
    tracing::info!(
        enabled = health.enabled,
        configured = health.configured,
        provider = %health.provider,
        "Email dispatcher ready"
    );

    let scheduler = runtime.start_scheduler().await?;
    if scheduler.is_none() {
        tracing::warn!("No scheduled jobs running; use paywatch-cli run-once to trigger jobs manually");
    }

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping...");

    if let Some(mut scheduler) = scheduler {
        if let Err(e) = scheduler.shutdown().await {
            tracing::error!("Scheduler shutdown error: {}", e);
        }
    }
    db.close().await;

    tracing::info!("PayWatch stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
