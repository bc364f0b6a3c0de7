//! Wiring of stores, dispatcher and jobs shared by the server and the CLI.

use std::sync::Arc;

use tracing;

use paywatch_core::config::AppConfig;
use paywatch_core::result::AppResult;
use paywatch_database::Stores;
use paywatch_mail::{EmailComposer, EmailDispatcher, RetryPolicy};
use paywatch_service::{NotificationGenerator, NotificationRules};

use crate::executor::JobExecutor;
use crate::jobs::{CriticalAlertSender, DailyDigestJob, DailyNotificationJob};
use crate::scheduler::CronScheduler;

/// Name used in email subjects and footers.
pub const PRODUCT_NAME: &str = "Budget App";

/// Fully wired PayWatch services.
#[derive(Debug, Clone)]
pub struct WorkerRuntime {
    pub config: Arc<AppConfig>,
    pub stores: Stores,
    pub dispatcher: Arc<EmailDispatcher>,
    pub composer: EmailComposer,
    pub generator: NotificationGenerator,
    pub notifications_job: Arc<DailyNotificationJob>,
    pub digest_job: Arc<DailyDigestJob>,
    pub executor: Arc<JobExecutor>,
}

impl WorkerRuntime {
    /// Wire everything with the configured email provider.
    pub fn from_config(config: AppConfig, stores: Stores) -> AppResult<Self> {
        let dispatcher = Arc::new(EmailDispatcher::from_config(
            config.email.clone(),
            stores.delivery_log.clone(),
        )?);
        Ok(Self::new(config, stores, dispatcher))
    }

    /// Wire everything around an existing dispatcher.
    pub fn new(config: AppConfig, stores: Stores, dispatcher: Arc<EmailDispatcher>) -> Self {
        let composer = EmailComposer::new(PRODUCT_NAME);
        let rules = NotificationRules::from_config(&config.rules);
        let generator = NotificationGenerator::new(
            stores.finance.clone(),
            stores.notifications.clone(),
            rules,
        );

        let mut notifications_job = DailyNotificationJob::new(stores.users.clone(), generator.clone());
        if config.scheduler.critical_alerts_enabled {
            notifications_job = notifications_job.with_alerts(CriticalAlertSender::new(
                stores.recipients.clone(),
                dispatcher.clone(),
                composer.clone(),
                RetryPolicy::from_config(&config.email),
            ));
        }
        let notifications_job = Arc::new(notifications_job);

        let digest_job = Arc::new(DailyDigestJob::new(
            stores.recipients.clone(),
            stores.notifications.clone(),
            dispatcher.clone(),
            composer.clone(),
        ));

        let mut executor = JobExecutor::new();
        executor.register(notifications_job.clone());
        executor.register(digest_job.clone());

        Self {
            config: Arc::new(config),
            stores,
            dispatcher,
            composer,
            generator,
            notifications_job,
            digest_job,
            executor: Arc::new(executor),
        }
    }

    /// Build and start the cron scheduler for the configured jobs.
    pub async fn start_scheduler(&self) -> AppResult<Option<CronScheduler>> {
        if !self.config.scheduler.enabled {
            tracing::info!("Scheduler disabled by configuration");
            return Ok(None);
        }
        let scheduler = CronScheduler::new(self.executor.clone()).await?;
        scheduler.register_default_tasks(&self.config.scheduler).await?;
        scheduler.start().await?;
        Ok(Some(scheduler))
    }
}
