//! Job executor: dispatches scheduled jobs by name.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde_json::Value;
use tracing;

use paywatch_core::error::AppError;

/// Parameters of one job invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunContext {
    /// Calendar date the run is for.
    pub today: NaiveDate,
    /// Run even if this date was already completed.
    pub force: bool,
}

impl RunContext {
    /// A scheduled run for the current local date.
    pub fn scheduled() -> Self {
        Self {
            today: Local::now().date_naive(),
            force: false,
        }
    }

    /// A run for an explicit date.
    pub fn for_date(today: NaiveDate, force: bool) -> Self {
        Self { today, force }
    }
}

/// Trait for scheduled job implementations
#[async_trait]
pub trait ScheduledJob: Send + Sync + std::fmt::Debug {
    /// Name used for registration and logs
    fn name(&self) -> &str;

    /// Run the job and return a JSON report
    async fn run(&self, ctx: RunContext) -> Result<Value, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure, do not retry
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// Transient failure, may retry
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// A previous invocation is still running
    #[error("Job '{0}' is already running")]
    AlreadyRunning(String),

    /// The job already completed for this date
    #[error("Job '{job}' already completed for {date}")]
    AlreadyCompleted { job: String, date: NaiveDate },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(AppError),
}

impl From<AppError> for JobExecutionError {
    fn from(err: AppError) -> Self {
        if err.is_transient() {
            Self::Transient(err.to_string())
        } else {
            Self::Internal(err)
        }
    }
}

impl JobExecutionError {
    /// Skips are expected outcomes, not failures.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::AlreadyRunning(_) | Self::AlreadyCompleted { .. })
    }
}

/// Dispatches jobs to the registered implementation by name
#[derive(Debug, Default)]
pub struct JobExecutor {
    jobs: HashMap<String, Arc<dyn ScheduledJob>>,
}

impl JobExecutor {
    /// Create an empty executor
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job
    pub fn register(&mut self, job: Arc<dyn ScheduledJob>) {
        let name = job.name().to_string();
        tracing::info!(job = %name, "Registered scheduled job");
        self.jobs.insert(name, job);
    }

    /// Run a job by name
    pub async fn execute(&self, name: &str, ctx: RunContext) -> Result<Value, JobExecutionError> {
        let job = self.jobs.get(name).ok_or_else(|| {
            JobExecutionError::Permanent(format!("No job registered under '{name}'"))
        })?;

        tracing::info!(job = %name, date = %ctx.today, force = ctx.force, "Executing job");
        job.run(ctx).await
    }

    /// Check if a job is registered
    pub fn has_job(&self, name: &str) -> bool {
        self.jobs.contains_key(name)
    }

    /// Names of the registered jobs, sorted
    pub fn registered(&self) -> Vec<String> {
        let mut names: Vec<String> = self.jobs.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Echo;

    #[async_trait]
    impl ScheduledJob for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn run(&self, ctx: RunContext) -> Result<Value, JobExecutionError> {
            Ok(serde_json::json!({ "date": ctx.today.to_string() }))
        }
    }

    #[tokio::test]
    async fn test_dispatch_by_name() {
        let mut executor = JobExecutor::new();
        executor.register(Arc::new(Echo));
        let ctx = RunContext::for_date(NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(), false);

        let out = executor.execute("echo", ctx).await.unwrap();
        assert_eq!(out["date"], "2026-09-12");

        let missing = executor.execute("nope", ctx).await.unwrap_err();
        assert!(matches!(missing, JobExecutionError::Permanent(_)));
        assert_eq!(executor.registered(), vec!["echo".to_string()]);
    }

    #[test]
    fn test_app_errors_split_into_transient_and_internal() {
        let db: JobExecutionError = AppError::database("connection reset").into();
        assert!(matches!(db, JobExecutionError::Transient(ref m) if m.contains("connection reset")));

        let upstream: JobExecutionError = AppError::external_service("503").into();
        assert!(matches!(upstream, JobExecutionError::Transient(_)));

        let bad: JobExecutionError = AppError::validation("bad date").into();
        assert!(matches!(bad, JobExecutionError::Internal(_)));
        assert!(!bad.is_skip());
    }
}
