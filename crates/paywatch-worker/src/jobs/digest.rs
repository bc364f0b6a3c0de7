//! Daily email digest of open notifications.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing;

use paywatch_database::{NotificationStore, RecipientSource};
use paywatch_entity::delivery::EmailType;
use paywatch_entity::recipient::Recipient;
use paywatch_mail::{DispatchReason, EmailComposer, EmailDispatcher, RetryPolicy, SendContext};

use super::notification::UserFailure;
use crate::executor::{JobExecutionError, RunContext, ScheduledJob};

/// Job name used for registration.
pub const DAILY_DIGEST: &str = "daily_digest";

/// Outcome of one digest run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DigestReport {
    pub recipients: usize,
    pub sent: usize,
    /// Recipients with nothing open.
    pub empty: usize,
    pub failed: usize,
    /// Stopped early because the circuit breaker opened.
    pub aborted_by_breaker: bool,
    pub failures: Vec<UserFailure>,
}

/// Emails each opted-in user a summary of their open, unread notifications.
#[derive(Debug)]
pub struct DailyDigestJob {
    recipients: Arc<dyn RecipientSource>,
    notifications: Arc<dyn NotificationStore>,
    dispatcher: Arc<EmailDispatcher>,
    composer: EmailComposer,
    retry: RetryPolicy,
    batch_size: usize,
    running: Mutex<()>,
}

impl DailyDigestJob {
    /// Create a new digest job.
    pub fn new(
        recipients: Arc<dyn RecipientSource>,
        notifications: Arc<dyn NotificationStore>,
        dispatcher: Arc<EmailDispatcher>,
        composer: EmailComposer,
    ) -> Self {
        let retry = RetryPolicy::from_config(dispatcher.config());
        let batch_size = dispatcher.config().batch_size.max(1);
        Self {
            recipients,
            notifications,
            dispatcher,
            composer,
            retry,
            batch_size,
            running: Mutex::new(()),
        }
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Send the digest for `ctx.today`.
    pub async fn run_digest(&self, ctx: RunContext) -> Result<DigestReport, JobExecutionError> {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::warn!("Daily digest already in progress, skipping");
            return Err(JobExecutionError::AlreadyRunning(DAILY_DIGEST.to_string()));
        };

        if !self.dispatcher.is_enabled() {
            tracing::info!("Email disabled, daily digest not sent");
            return Ok(DigestReport::default());
        }

        let recipients = self.recipients.digest_recipients().await?;
        let mut report = DigestReport {
            recipients: recipients.len(),
            ..Default::default()
        };

        'batches: for (index, batch) in recipients.chunks(self.batch_size).enumerate() {
            tracing::debug!(batch = index, size = batch.len(), "Sending digest batch");
            for recipient in batch {
                match self.send_one(recipient, ctx).await {
                    Ok(None) => report.empty += 1,
                    Ok(Some(DispatchReason::Sent)) => report.sent += 1,
                    Ok(Some(reason)) => {
                        report.failed += 1;
                        report.failures.push(UserFailure {
                            user_id: recipient.user_id,
                            error: reason.as_str().to_string(),
                        });
                        if reason == DispatchReason::CircuitBreakerOpen {
                            tracing::warn!("Circuit breaker open, stopping daily digest");
                            report.aborted_by_breaker = true;
                            break 'batches;
                        }
                    }
                    Err(e) => {
                        tracing::error!(user_id = %recipient.user_id, error = %e, "Error building digest for user");
                        report.failed += 1;
                        report.failures.push(UserFailure {
                            user_id: recipient.user_id,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        tracing::info!(
            recipients = report.recipients,
            sent = report.sent,
            empty = report.empty,
            failed = report.failed,
            "Daily digest completed"
        );
        Ok(report)
    }

    async fn send_one(
        &self,
        recipient: &Recipient,
        ctx: RunContext,
    ) -> Result<Option<DispatchReason>, JobExecutionError> {
        let open = self.notifications.list_open_unread(recipient.user_id).await?;
        let Some(email) = self.composer.daily_digest(recipient, &open, ctx.today) else {
            return Ok(None);
        };

        let send_ctx = SendContext::new(EmailType::DailyDigest).for_user(recipient.user_id);
        let result = self
            .retry
            .send_with_retry(
                &self.dispatcher,
                &recipient.email,
                &email.subject,
                &email.html,
                Some(&email.text),
                send_ctx,
            )
            .await;
        Ok(Some(result.reason))
    }
}

#[async_trait]
impl ScheduledJob for DailyDigestJob {
    fn name(&self) -> &str {
        DAILY_DIGEST
    }

    async fn run(&self, ctx: RunContext) -> Result<Value, JobExecutionError> {
        let report = self.run_digest(ctx).await?;
        serde_json::to_value(report)
            .map_err(|e| JobExecutionError::Internal(e.into()))
    }
}
