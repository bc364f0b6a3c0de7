//! Email Dispatcher: one send through the provider, guarded and logged.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use validator::ValidateEmail;

use paywatch_core::config::EmailConfig;
use paywatch_core::result::AppResult;
use paywatch_core::traits::{EmailProvider, OutgoingEmail};
use paywatch_database::DeliveryLogStore;
use paywatch_entity::delivery::{DeliveryResolution, EmailType, NewDeliveryAttempt};

use crate::breaker::CircuitBreaker;
use crate::classify::is_retryable;
use crate::pacing::SendPacer;
use crate::provider::ResendProvider;
use crate::stats::{DispatchCounters, DispatchHealth, DispatchStats};
use crate::templates::strip_html;

/// Who and what a send is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendContext {
    /// User the email concerns, if any.
    pub user_id: Option<Uuid>,
    pub email_type: EmailType,
    /// Zero for a first try; set by the caller when it retries.
    pub retry_count: u32,
}

impl SendContext {
    /// First try of an email of `email_type`.
    pub fn new(email_type: EmailType) -> Self {
        Self {
            user_id: None,
            email_type,
            retry_count: 0,
        }
    }

    /// Attach the user the email concerns.
    pub fn for_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Context for the next retry.
    pub fn next_retry(self) -> Self {
        Self {
            retry_count: self.retry_count + 1,
            ..self
        }
    }
}

/// Why a send ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchReason {
    /// Provider accepted the message.
    Sent,
    /// Malformed recipient or empty subject/body; nothing was attempted.
    InvalidInput,
    /// Email is switched off or no provider is configured.
    Disabled,
    /// The breaker is open; the provider was not called.
    CircuitBreakerOpen,
    /// The provider call failed.
    ProviderError,
}

impl DispatchReason {
    /// Return the reason as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::InvalidInput => "invalid_input",
            Self::Disabled => "disabled",
            Self::CircuitBreakerOpen => "circuit_breaker_open",
            Self::ProviderError => "provider_error",
        }
    }
}

/// Outcome of [`EmailDispatcher::send`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
    /// Only set for provider failures.
    pub retryable: Option<bool>,
    pub reason: DispatchReason,
}

impl DispatchResult {
    fn sent(message_id: String) -> Self {
        Self {
            success: true,
            message_id: Some(message_id),
            error: None,
            retryable: None,
            reason: DispatchReason::Sent,
        }
    }

    fn rejected(reason: DispatchReason, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
            retryable: None,
            reason,
        }
    }

    fn provider_failure(error: String, retryable: bool) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error),
            retryable: Some(retryable),
            reason: DispatchReason::ProviderError,
        }
    }

    /// Whether a caller-side retry is worthwhile.
    pub fn should_retry(&self) -> bool {
        self.retryable == Some(true)
    }
}

/// Sends single emails through a provider behind a circuit breaker.
///
/// One instance is shared by every sender in the process so that breaker
/// state, pacing and counters are process-wide.
#[derive(Debug)]
pub struct EmailDispatcher {
    config: EmailConfig,
    provider: Option<Arc<dyn EmailProvider>>,
    log: Arc<dyn DeliveryLogStore>,
    breaker: CircuitBreaker,
    pacer: SendPacer,
    stats: DispatchStats,
}

impl EmailDispatcher {
    /// Build a dispatcher with the Resend provider when an API key is configured.
    pub fn from_config(config: EmailConfig, log: Arc<dyn DeliveryLogStore>) -> AppResult<Self> {
        let provider: Option<Arc<dyn EmailProvider>> = if config.api_key_configured() {
            Some(Arc::new(ResendProvider::from_config(&config)?))
        } else {
            warn!("Email API key not configured; email delivery is disabled");
            None
        };
        Ok(Self::build(config, provider, log))
    }

    /// Build a dispatcher around an explicit provider.
    pub fn with_provider(
        config: EmailConfig,
        provider: Arc<dyn EmailProvider>,
        log: Arc<dyn DeliveryLogStore>,
    ) -> Self {
        Self::build(config, Some(provider), log)
    }

    fn build(
        config: EmailConfig,
        provider: Option<Arc<dyn EmailProvider>>,
        log: Arc<dyn DeliveryLogStore>,
    ) -> Self {
        let breaker =
            CircuitBreaker::new(config.circuit_breaker_threshold, config.reset_timeout());
        let pacer = SendPacer::per_minute(config.rate_limit_per_minute);
        Self {
            config,
            provider,
            log,
            breaker,
            pacer,
            stats: DispatchStats::default(),
        }
    }

    /// Email configuration in effect.
    pub fn config(&self) -> &EmailConfig {
        &self.config
    }

    /// Whether sends can reach a provider at all.
    pub fn is_enabled(&self) -> bool {
        self.config.is_active() && self.provider.is_some()
    }

    /// Send one email.
    ///
    /// Never returns an error: every outcome is a [`DispatchResult`]. At most
    /// one delivery attempt is logged, and only when the provider is called.
    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: Option<&str>,
        ctx: &SendContext,
    ) -> DispatchResult {
        if !is_valid_recipient(to) {
            debug!(to = %to, "Rejected email with invalid recipient");
            return DispatchResult::rejected(
                DispatchReason::InvalidInput,
                format!("Invalid email address: {to}"),
            );
        }
        if subject.trim().is_empty() || html.trim().is_empty() {
            return DispatchResult::rejected(
                DispatchReason::InvalidInput,
                "Missing required email fields: subject, html",
            );
        }

        let provider = match &self.provider {
            Some(provider) if self.is_enabled() => provider,
            _ => {
                debug!(to = %to, email_type = %ctx.email_type, "Email disabled, not sending");
                return DispatchResult::rejected(DispatchReason::Disabled, "Email service is disabled");
            }
        };

        if !self.breaker.check().await {
            self.stats.record_rejected();
            warn!(
                to = %to,
                email_type = %ctx.email_type,
                "Email rejected: circuit breaker open"
            );
            return DispatchResult::rejected(
                DispatchReason::CircuitBreakerOpen,
                "Circuit breaker is open",
            );
        }

        self.pacer.acquire().await;

        let email = OutgoingEmail {
            from: self.config.sender(),
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
            text: text.map(str::to_string).unwrap_or_else(|| strip_html(html)),
        };
        let attempt_id = self.open_attempt(&email, ctx).await;

        match provider.send(&email).await {
            Ok(receipt) => {
                self.breaker.record_success().await;
                self.stats.record_sent();
                info!(
                    to = %to,
                    email_type = %ctx.email_type,
                    message_id = %receipt.id,
                    "Email sent"
                );
                self.close_attempt(
                    attempt_id,
                    DeliveryResolution::Sent {
                        message_id: receipt.id.clone(),
                    },
                )
                .await;
                DispatchResult::sent(receipt.id)
            }
            Err(err) => {
                let retryable = is_retryable(&err);
                self.breaker.record_failure().await;
                self.stats.record_failed();
                error!(
                    to = %to,
                    email_type = %ctx.email_type,
                    status = ?err.status,
                    retryable,
                    error = %err,
                    "Email send failed"
                );
                self.close_attempt(
                    attempt_id,
                    DeliveryResolution::Failed {
                        error: err.message.clone(),
                    },
                )
                .await;
                DispatchResult::provider_failure(err.message, retryable)
            }
        }
    }

    async fn open_attempt(&self, email: &OutgoingEmail, ctx: &SendContext) -> Option<Uuid> {
        let attempt = NewDeliveryAttempt {
            user_id: ctx.user_id,
            email_type: ctx.email_type,
            recipient_email: email.to.clone(),
            subject: email.subject.clone(),
            retry_count: ctx.retry_count as i32,
        };
        match self.log.record(&attempt).await {
            Ok(row) => Some(row.id),
            Err(e) => {
                error!(error = %e, to = %email.to, "Failed to record delivery attempt");
                None
            }
        }
    }

    async fn close_attempt(&self, attempt_id: Option<Uuid>, resolution: DeliveryResolution) {
        let Some(id) = attempt_id else {
            return;
        };
        if let Err(e) = self.log.resolve(id, &resolution).await {
            error!(error = %e, attempt_id = %id, "Failed to resolve delivery attempt");
        }
    }

    /// Health report.
    pub async fn health(&self) -> DispatchHealth {
        DispatchHealth {
            enabled: self.config.enabled,
            configured: self.provider.is_some(),
            provider: self
                .provider
                .as_ref()
                .map(|p| p.name().to_string())
                .unwrap_or_else(|| "none".to_string()),
            breaker: self.breaker.snapshot().await,
            counters: self.stats.snapshot(),
            pacing_tokens: self.pacer.available().await,
        }
    }

    /// In-memory counters.
    pub fn stats(&self) -> DispatchCounters {
        self.stats.snapshot()
    }

    /// Zero the in-memory counters.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }
}

/// Syntactic check plus a dotted domain, so `user@localhost` is refused.
fn is_valid_recipient(to: &str) -> bool {
    if !to.validate_email() || to.chars().any(char::is_whitespace) {
        return false;
    }
    match to.rsplit_once('@') {
        Some((_, domain)) => {
            domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use paywatch_core::traits::{ProviderError, ProviderReceipt};
    use paywatch_database::MemoryStore;
    use paywatch_entity::delivery::DeliveryStatus;

    use super::*;
    use crate::breaker::BreakerState;

    #[derive(Debug, Default)]
    struct ScriptedProvider {
        script: Mutex<VecDeque<Result<ProviderReceipt, ProviderError>>>,
        calls: Mutex<Vec<OutgoingEmail>>,
    }

    impl ScriptedProvider {
        fn push(&self, outcome: Result<&str, ProviderError>) {
            self.script.lock().unwrap().push_back(outcome.map(|id| ProviderReceipt {
                id: id.to_string(),
            }));
        }

        fn calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl EmailProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn send(&self, email: &OutgoingEmail) -> Result<ProviderReceipt, ProviderError> {
            self.calls.lock().unwrap().push(email.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::http(500, "unscripted")))
        }
    }

    fn config() -> EmailConfig {
        EmailConfig {
            enabled: true,
            api_key: Some("re_live_key".into()),
            rate_limit_per_minute: 0,
            circuit_breaker_threshold: 3,
            circuit_breaker_reset_timeout_seconds: 300,
            ..Default::default()
        }
    }

    fn setup(config: EmailConfig) -> (EmailDispatcher, Arc<ScriptedProvider>, Arc<MemoryStore>) {
        let provider = Arc::new(ScriptedProvider::default());
        let store = Arc::new(MemoryStore::new());
        let dispatcher = EmailDispatcher::with_provider(config, provider.clone(), store.clone());
        (dispatcher, provider, store)
    }

    fn ctx() -> SendContext {
        SendContext::new(EmailType::Test).for_user(Uuid::nil())
    }

    #[tokio::test]
    async fn test_success_logs_sent_attempt() {
        let (dispatcher, provider, store) = setup(config());
        provider.push(Ok("msg_1"));

        let result = dispatcher
            .send("user@example.com", "Hi", "<p>Hello <b>you</b></p>", None, &ctx())
            .await;
        assert!(result.success);
        assert_eq!(result.message_id.as_deref(), Some("msg_1"));

        let attempts = store.delivery_attempts();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].status, DeliveryStatus::Sent);
        assert_eq!(attempts[0].provider_message_id.as_deref(), Some("msg_1"));
        assert!(attempts[0].sent_at.is_some());

        let sent = provider.calls.lock().unwrap()[0].clone();
        assert_eq!(sent.text, "Hello you");
        assert_eq!(dispatcher.stats().sent, 1);
    }

    #[tokio::test]
    async fn test_invalid_recipient_fails_fast() {
        let (dispatcher, provider, store) = setup(config());
        let result = dispatcher
            .send("not-an-address", "Hi", "<p>x</p>", None, &ctx())
            .await;
        assert_eq!(result.reason, DispatchReason::InvalidInput);
        assert_eq!(provider.calls(), 0);
        assert!(store.delivery_attempts().is_empty());
        assert_eq!(dispatcher.health().await.breaker.consecutive_failures, 0);
    }

    #[tokio::test]
    async fn test_recipient_without_dotted_domain_is_rejected() {
        let (dispatcher, provider, store) = setup(config());
        for to in ["a@b", "a@.com", "a@b.", "a b@example.com"] {
            let result = dispatcher.send(to, "Hi", "<p>x</p>", None, &ctx()).await;
            assert_eq!(result.reason, DispatchReason::InvalidInput, "{to}");
        }
        assert_eq!(provider.calls(), 0);
        assert!(store.delivery_attempts().is_empty());
    }

    #[tokio::test]
    async fn test_placeholder_api_key_counts_as_disabled() {
        let (dispatcher, provider, store) = setup(EmailConfig {
            api_key: Some(paywatch_core::config::email::PLACEHOLDER_API_KEY.into()),
            ..config()
        });
        assert!(!dispatcher.is_enabled());
        let result = dispatcher
            .send("user@example.com", "Hi", "<p>x</p>", None, &ctx())
            .await;
        assert_eq!(result.reason, DispatchReason::Disabled);
        assert_eq!(provider.calls(), 0);
        assert!(store.delivery_attempts().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_does_not_call_provider() {
        let (dispatcher, provider, _) = setup(EmailConfig {
            enabled: false,
            ..config()
        });
        let result = dispatcher
            .send("user@example.com", "Hi", "<p>x</p>", None, &ctx())
            .await;
        assert_eq!(result.reason, DispatchReason::Disabled);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_failure_is_classified_and_logged() {
        let (dispatcher, provider, store) = setup(config());
        provider.push(Err(ProviderError::http(429, "Rate limit exceeded")));
        provider.push(Err(ProviderError::http(422, "Invalid `to` field")));

        let first = dispatcher
            .send("user@example.com", "Hi", "<p>x</p>", None, &ctx())
            .await;
        assert_eq!(first.retryable, Some(true));

        let second = dispatcher
            .send("user@example.com", "Hi", "<p>x</p>", None, &ctx())
            .await;
        assert_eq!(second.retryable, Some(false));
        assert_eq!(second.reason, DispatchReason::ProviderError);

        let attempts = store.delivery_attempts();
        assert_eq!(attempts.len(), 2);
        assert!(attempts.iter().all(|a| a.status == DeliveryStatus::Failed));
        assert_eq!(attempts[1].error_message.as_deref(), Some("Invalid `to` field"));
        assert_eq!(dispatcher.health().await.breaker.consecutive_failures, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_breaker_short_circuits() {
        let (dispatcher, provider, store) = setup(config());
        for _ in 0..3 {
            provider.push(Err(ProviderError::http(503, "unavailable")));
            dispatcher
                .send("user@example.com", "Hi", "<p>x</p>", None, &ctx())
                .await;
        }

        let rejected = dispatcher
            .send("user@example.com", "Hi", "<p>x</p>", None, &ctx())
            .await;
        assert_eq!(rejected.reason, DispatchReason::CircuitBreakerOpen);
        assert_eq!(rejected.retryable, None);
        assert_eq!(provider.calls(), 3);
        assert_eq!(store.delivery_attempts().len(), 3);
        assert_eq!(dispatcher.stats().rejected_by_breaker, 1);
        assert!(!dispatcher.health().await.is_healthy());

        tokio::time::advance(Duration::from_secs(300)).await;
        provider.push(Ok("msg_ok"));
        let trial = dispatcher
            .send("user@example.com", "Hi", "<p>x</p>", None, &ctx())
            .await;
        assert!(trial.success);
        let health = dispatcher.health().await;
        assert_eq!(health.breaker.state, BreakerState::Closed);
        assert_eq!(health.breaker.consecutive_failures, 0);
    }

    #[tokio::test]
    async fn test_reset_stats() {
        let (dispatcher, provider, _) = setup(config());
        provider.push(Ok("m"));
        dispatcher
            .send("user@example.com", "Hi", "<p>x</p>", Some("x"), &ctx())
            .await;
        dispatcher.reset_stats();
        assert_eq!(dispatcher.stats(), DispatchCounters::default());
    }
}
