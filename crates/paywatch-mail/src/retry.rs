//! Caller-side retry around [`EmailDispatcher::send`].

use std::time::Duration;

use tracing::{debug, warn};

use paywatch_core::config::EmailConfig;

use crate::dispatcher::{DispatchResult, EmailDispatcher, SendContext};

/// Bounded exponential backoff for retryable send failures.
///
/// Each retry is a fresh dispatch, so it is logged as a new delivery attempt
/// with an incremented retry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first try.
    pub max_retries: u32,
    /// Delay before the first retry; doubles each time.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Policy from `retry_attempts` and `retry_delay_ms`.
    pub fn from_config(config: &EmailConfig) -> Self {
        Self {
            max_retries: config.retry_attempts,
            base_delay: config.retry_delay(),
        }
    }

    /// No retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    /// Send, retrying while the result is retryable and retries remain.
    pub async fn send_with_retry(
        &self,
        dispatcher: &EmailDispatcher,
        to: &str,
        subject: &str,
        html: &str,
        text: Option<&str>,
        ctx: SendContext,
    ) -> DispatchResult {
        let mut ctx = ctx;
        let mut result = dispatcher.send(to, subject, html, text, &ctx).await;

        while !result.success && result.should_retry() && ctx.retry_count < self.max_retries {
            ctx = ctx.next_retry();
            let delay = self.delay_for(ctx.retry_count);
            debug!(
                to = %to,
                retry = ctx.retry_count,
                delay_ms = delay.as_millis() as u64,
                "Retrying email send"
            );
            tokio::time::sleep(delay).await;
            result = dispatcher.send(to, subject, html, text, &ctx).await;
        }

        if !result.success && ctx.retry_count > 0 {
            warn!(
                to = %to,
                retries = ctx.retry_count,
                reason = result.reason.as_str(),
                "Email send gave up after retries"
            );
        }
        result
    }
}
