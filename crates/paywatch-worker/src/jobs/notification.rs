//! Daily notification batch.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing;
use uuid::Uuid;

use paywatch_database::UserSource;
use paywatch_service::NotificationGenerator;

use super::alerts::CriticalAlertSender;
use crate::executor::{JobExecutionError, RunContext, ScheduledJob};

/// Job name used for registration.
pub const DAILY_NOTIFICATIONS: &str = "daily_notifications";

/// A user whose run failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserFailure {
    pub user_id: Uuid,
    pub error: String,
}

/// Outcome of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub run_date: Option<NaiveDate>,
    /// Active users found.
    pub users_total: usize,
    /// Users attempted, whether or not they failed.
    pub users_processed: usize,
    pub users_failed: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub alerts_sent: usize,
    pub failures: Vec<UserFailure>,
    pub duration_ms: u64,
}

#[derive(Debug, Default)]
struct RunState {
    last_completed: Option<NaiveDate>,
}

/// Scans every active user once per day and persists their notifications.
///
/// Users are processed sequentially. A failure for one user is logged and
/// recorded in the report; the sweep continues with the next user. Runs
/// never overlap, and a date that already completed is not run again
/// unless forced.
#[derive(Debug)]
pub struct DailyNotificationJob {
    users: Arc<dyn UserSource>,
    generator: NotificationGenerator,
    alerts: Option<CriticalAlertSender>,
    state: Mutex<RunState>,
}

impl DailyNotificationJob {
    /// Create a new batch job.
    pub fn new(users: Arc<dyn UserSource>, generator: NotificationGenerator) -> Self {
        Self {
            users,
            generator,
            alerts: None,
            state: Mutex::new(RunState::default()),
        }
    }

    /// Email high-priority notifications as they are created.
    pub fn with_alerts(mut self, alerts: CriticalAlertSender) -> Self {
        self.alerts = Some(alerts);
        self
    }

    /// Run the batch for `ctx.today`.
    pub async fn run_daily(&self, ctx: RunContext) -> Result<BatchReport, JobExecutionError> {
        let Ok(mut state) = self.state.try_lock() else {
            tracing::warn!(date = %ctx.today, "Daily notification run already in progress, skipping");
            return Err(JobExecutionError::AlreadyRunning(DAILY_NOTIFICATIONS.to_string()));
        };
        if !ctx.force && state.last_completed == Some(ctx.today) {
            tracing::warn!(date = %ctx.today, "Daily notifications already generated for this date, skipping");
            return Err(JobExecutionError::AlreadyCompleted {
                job: DAILY_NOTIFICATIONS.to_string(),
                date: ctx.today,
            });
        }

        let started = Instant::now();
        tracing::info!(date = %ctx.today, "Starting daily notification generation");

        let user_ids = self.users.active_user_ids().await?;
        let mut report = BatchReport {
            run_date: Some(ctx.today),
            users_total: user_ids.len(),
            ..Default::default()
        };

        for user_id in user_ids {
            report.users_processed += 1;
            match self.generator.run_for_user(user_id, ctx.today).await {
                Ok(summary) => {
                    report.created += summary.created.len();
                    report.updated += summary.updated.len();
                    report.skipped += summary.skipped;
                    if let Some(alerts) = &self.alerts {
                        report.alerts_sent += alerts.send_for(&summary.created).await;
                    }
                }
                Err(e) => {
                    tracing::error!(user_id = %user_id, error = %e, "Error generating notifications for user");
                    report.users_failed += 1;
                    report.failures.push(UserFailure {
                        user_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        state.last_completed = Some(ctx.today);

        tracing::info!(
            date = %ctx.today,
            users_processed = report.users_processed,
            users_failed = report.users_failed,
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            alerts_sent = report.alerts_sent,
            duration_ms = report.duration_ms,
            "Daily notification generation completed"
        );
        Ok(report)
    }

    /// Date of the last completed run.
    pub async fn last_completed(&self) -> Option<NaiveDate> {
        self.state.lock().await.last_completed
    }
}

#[async_trait]
impl ScheduledJob for DailyNotificationJob {
    fn name(&self) -> &str {
        DAILY_NOTIFICATIONS
    }

    async fn run(&self, ctx: RunContext) -> Result<Value, JobExecutionError> {
        let report = self.run_daily(ctx).await?;
        serde_json::to_value(report)
            .map_err(|e| JobExecutionError::Internal(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paywatch_database::MemoryStore;
    use paywatch_entity::finance::FixedPayment;
    use paywatch_service::NotificationRules;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, d).unwrap()
    }

    fn job(store: &Arc<MemoryStore>) -> DailyNotificationJob {
        let generator =
            NotificationGenerator::new(store.clone(), store.clone(), NotificationRules::default());
        DailyNotificationJob::new(store.clone(), generator)
    }

    fn seed_user(store: &MemoryStore) -> Uuid {
        let user = Uuid::new_v4();
        store.add_user(user);
        store.add_fixed_payment(FixedPayment {
            id: Uuid::new_v4(),
            user_id: user,
            name: "Rent".into(),
            amount: 5000.0,
            due_day: Some(15),
            is_active: true,
            last_paid_on: None,
        });
        user
    }

    #[tokio::test]
    async fn test_same_date_runs_once_unless_forced() {
        let store = Arc::new(MemoryStore::new());
        seed_user(&store);
        let job = job(&store);

        let first = job.run_daily(RunContext::for_date(date(12), false)).await.unwrap();
        assert_eq!(first.created, 1);

        let again = job.run_daily(RunContext::for_date(date(12), false)).await;
        assert!(matches!(again, Err(JobExecutionError::AlreadyCompleted { .. })));

        let forced = job.run_daily(RunContext::for_date(date(12), true)).await.unwrap();
        assert_eq!(forced.created, 0);
        assert_eq!(forced.skipped, 1);
        assert_eq!(job.last_completed().await, Some(date(12)));
    }

    #[tokio::test]
    async fn test_overlapping_run_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let job = job(&store);
        let _held = job.state.lock().await;

        let result = job.run_daily(RunContext::for_date(date(12), false)).await;
        assert!(matches!(result, Err(JobExecutionError::AlreadyRunning(_))));
        assert!(result.unwrap_err().is_skip());
    }
}
