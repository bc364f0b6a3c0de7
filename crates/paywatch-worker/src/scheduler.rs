//! Cron scheduler for the daily jobs.

use std::sync::Arc;

use chrono::Local;
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use paywatch_core::config::SchedulerConfig;
use paywatch_core::error::AppError;

use crate::executor::{JobExecutionError, JobExecutor, RunContext};
use crate::jobs::{DAILY_DIGEST, DAILY_NOTIFICATIONS};

/// Triggers registered jobs at fixed local wall-clock times
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Jobs to trigger
    executor: Arc<JobExecutor>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("jobs", &self.executor.registered())
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(executor: Arc<JobExecutor>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            executor,
        })
    }

    /// Register the daily jobs enabled in configuration
    pub async fn register_default_tasks(&self, config: &SchedulerConfig) -> Result<(), AppError> {
        self.register(DAILY_NOTIFICATIONS, &config.daily_notifications_cron)
            .await?;
        if config.digest_enabled {
            self.register(DAILY_DIGEST, &config.daily_digest_cron).await?;
        }

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Trigger the job registered as `name` on a six-field cron expression
    pub async fn register(&self, name: &str, cron: &str) -> Result<(), AppError> {
        if !self.executor.has_job(name) {
            return Err(AppError::configuration(format!(
                "No job registered under '{name}'"
            )));
        }

        let executor = Arc::clone(&self.executor);
        let job_name = name.to_string();
        let job = CronJob::new_async_tz(cron, Local, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            let job_name = job_name.clone();
            Box::pin(async move {
                match executor.execute(&job_name, RunContext::scheduled()).await {
                    Ok(report) => {
                        tracing::info!(job = %job_name, report = %report, "Scheduled job finished");
                    }
                    Err(e) if e.is_skip() => {
                        tracing::warn!(job = %job_name, reason = %e, "Scheduled job skipped");
                    }
                    Err(e @ JobExecutionError::Transient(_)) => {
                        tracing::warn!(job = %job_name, error = %e, "Scheduled job failed, next run will retry");
                    }
                    Err(e) => {
                        tracing::error!(job = %job_name, error = %e, "Scheduled job failed");
                    }
                }
            })
        })
        .map_err(|e| AppError::configuration(format!("Invalid schedule '{cron}' for {name}: {e}")))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {name} schedule: {e}")))?;

        tracing::info!(job = %name, cron = %cron, "Registered scheduled job");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
