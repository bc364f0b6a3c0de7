//! End-to-end runs of the daily jobs over the in-memory store.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use paywatch_core::config::{AppConfig, DatabaseConfig, EmailConfig};
use paywatch_core::traits::{EmailProvider, OutgoingEmail, ProviderError, ProviderReceipt};
use paywatch_database::{MemoryStore, Stores};
use paywatch_entity::delivery::{DeliveryStatus, EmailType};
use paywatch_entity::finance::FixedPayment;
use paywatch_entity::notification::{NotificationPriority, NotificationType};
use paywatch_entity::recipient::Recipient;
use paywatch_mail::{DispatchReason, EmailDispatcher, SendContext};
use paywatch_worker::jobs::DAILY_NOTIFICATIONS;
use paywatch_worker::{RunContext, WorkerRuntime};

#[derive(Debug, Default)]
struct ScriptedProvider {
    script: Mutex<VecDeque<Result<ProviderReceipt, ProviderError>>>,
    fail_by_default: bool,
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl ScriptedProvider {
    fn failing() -> Self {
        Self {
            fail_by_default: true,
            ..Default::default()
        }
    }

    fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<ProviderReceipt, ProviderError> {
        self.sent.lock().unwrap().push(email.clone());
        if let Some(outcome) = self.script.lock().unwrap().pop_front() {
            return outcome;
        }
        if self.fail_by_default {
            Err(ProviderError::http(500, "provider unavailable"))
        } else {
            Ok(ProviderReceipt {
                id: format!("msg_{}", Uuid::new_v4()),
            })
        }
    }
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, d).unwrap()
}

fn app_config() -> AppConfig {
    AppConfig {
        database: DatabaseConfig {
            url: "postgres://localhost/paywatch_test".into(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_seconds: 1,
            idle_timeout_seconds: 1,
        },
        logging: Default::default(),
        email: EmailConfig {
            enabled: true,
            api_key: Some("re_live_key".into()),
            rate_limit_per_minute: 0,
            retry_attempts: 0,
            ..Default::default()
        },
        scheduler: Default::default(),
        rules: Default::default(),
    }
}

fn runtime(
    config: AppConfig,
    provider: Arc<ScriptedProvider>,
) -> (WorkerRuntime, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let stores = Stores::memory(store.clone());
    let dispatcher = Arc::new(EmailDispatcher::with_provider(
        config.email.clone(),
        provider,
        stores.delivery_log.clone(),
    ));
    (WorkerRuntime::new(config, stores, dispatcher), store)
}

fn rent(user_id: Uuid, due_day: i32) -> FixedPayment {
    FixedPayment {
        id: Uuid::new_v4(),
        user_id,
        name: "Rent".into(),
        amount: 5000.0,
        due_day: Some(due_day),
        is_active: true,
        last_paid_on: None,
    }
}

fn recipient(user_id: Uuid, email: &str) -> Recipient {
    Recipient {
        user_id,
        email: email.into(),
        name: None,
        language: "tr".into(),
        email_enabled: true,
        daily_digest_enabled: true,
        critical_alerts_enabled: true,
    }
}

fn seed_user(store: &MemoryStore, due_day: i32) -> Uuid {
    let user = Uuid::new_v4();
    store.add_user(user);
    store.add_fixed_payment(rent(user, due_day));
    user
}

#[tokio::test]
async fn test_failing_user_does_not_stop_the_batch() {
    let (runtime, store) = runtime(app_config(), Arc::new(ScriptedProvider::default()));
    let first = seed_user(&store, 15);
    let broken = seed_user(&store, 15);
    let third = seed_user(&store, 15);
    store.fail_finance_for(broken);

    let report = runtime
        .notifications_job
        .run_daily(RunContext::for_date(date(12), false))
        .await
        .unwrap();

    assert_eq!(report.users_total, 3);
    assert_eq!(report.users_processed, 3);
    assert_eq!(report.users_failed, 1);
    assert_eq!(report.failures[0].user_id, broken);
    assert_eq!(report.created, 2);
    assert_eq!(store.notifications_for(first).len(), 1);
    assert!(store.notifications_for(broken).is_empty());
    assert_eq!(store.notifications_for(third).len(), 1);
}

#[tokio::test]
async fn test_forced_rerun_creates_nothing_new() {
    let (runtime, store) = runtime(app_config(), Arc::new(ScriptedProvider::default()));
    let user = seed_user(&store, 15);

    let first = runtime
        .notifications_job
        .run_daily(RunContext::for_date(date(12), false))
        .await
        .unwrap();
    let second = runtime
        .notifications_job
        .run_daily(RunContext::for_date(date(12), true))
        .await
        .unwrap();

    assert_eq!(first.created, 1);
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped, 1);
    let rows = store.notifications_for(user);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].notification_type, NotificationType::FixedPayment3Day);
}

#[tokio::test]
async fn test_overdue_is_updated_in_place_and_alerted_once() {
    let provider = Arc::new(ScriptedProvider::default());
    let (runtime, store) = runtime(app_config(), provider.clone());
    let user = seed_user(&store, 5);
    store.add_recipient(recipient(user, "ayse@example.com"));

    let day_one = runtime
        .notifications_job
        .run_daily(RunContext::for_date(date(12), false))
        .await
        .unwrap();
    let day_two = runtime
        .notifications_job
        .run_daily(RunContext::for_date(date(13), false))
        .await
        .unwrap();

    assert_eq!(day_one.created, 1);
    assert_eq!(day_one.alerts_sent, 1);
    assert_eq!(day_two.created, 0);
    assert_eq!(day_two.updated, 1);
    assert_eq!(day_two.alerts_sent, 0);

    let rows = store.notifications_for(user);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].notification_type, NotificationType::FixedPaymentOverdue);
    assert_eq!(rows[0].priority, NotificationPriority::High);
    assert!(rows[0].message.contains("8 gün önce"));

    let sent = provider.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ayse@example.com");
}

#[tokio::test]
async fn test_alerts_respect_scheduler_switch() {
    let mut config = app_config();
    config.scheduler.critical_alerts_enabled = false;
    let provider = Arc::new(ScriptedProvider::default());
    let (runtime, store) = runtime(config, provider.clone());
    let user = seed_user(&store, 5);
    store.add_recipient(recipient(user, "ayse@example.com"));

    let report = runtime
        .notifications_job
        .run_daily(RunContext::for_date(date(12), false))
        .await
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.alerts_sent, 0);
    assert!(provider.sent().is_empty());
}

#[tokio::test]
async fn test_executor_returns_batch_report_as_json() {
    let (runtime, store) = runtime(app_config(), Arc::new(ScriptedProvider::default()));
    seed_user(&store, 15);

    let value = runtime
        .executor
        .execute(DAILY_NOTIFICATIONS, RunContext::for_date(date(12), false))
        .await
        .unwrap();

    assert_eq!(value["created"], 1);
    assert_eq!(value["users_processed"], 1);
    assert_eq!(value["run_date"], "2026-09-12");
}

#[tokio::test]
async fn test_digest_skips_users_without_open_notifications() {
    let mut config = app_config();
    config.scheduler.critical_alerts_enabled = false;
    let provider = Arc::new(ScriptedProvider::default());
    let (runtime, store) = runtime(config, provider.clone());
    let busy = seed_user(&store, 15);
    let idle = Uuid::new_v4();
    store.add_user(idle);
    store.add_recipient(recipient(busy, "busy@example.com"));
    store.add_recipient(recipient(idle, "idle@example.com"));

    runtime
        .notifications_job
        .run_daily(RunContext::for_date(date(12), false))
        .await
        .unwrap();
    let report = runtime
        .digest_job
        .run_digest(RunContext::for_date(date(12), false))
        .await
        .unwrap();

    assert_eq!(report.recipients, 2);
    assert_eq!(report.sent, 1);
    assert_eq!(report.empty, 1);
    assert!(!report.aborted_by_breaker);
    let sent = provider.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "busy@example.com");

    let attempts = store.delivery_attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].status, DeliveryStatus::Sent);
    assert_eq!(attempts[0].email_type, "daily_digest");
}

#[tokio::test]
async fn test_digest_stops_once_breaker_opens() {
    let mut config = app_config();
    config.email.circuit_breaker_threshold = 1;
    config.scheduler.critical_alerts_enabled = false;
    let provider = Arc::new(ScriptedProvider::failing());
    let (runtime, store) = runtime(config, provider.clone());
    for email in ["a@example.com", "b@example.com", "c@example.com"] {
        let user = seed_user(&store, 15);
        store.add_recipient(recipient(user, email));
    }

    runtime
        .notifications_job
        .run_daily(RunContext::for_date(date(12), false))
        .await
        .unwrap();
    let report = runtime
        .digest_job
        .run_digest(RunContext::for_date(date(12), false))
        .await
        .unwrap();

    assert!(report.aborted_by_breaker);
    assert_eq!(report.sent, 0);
    assert_eq!(report.failed, 2);
    assert_eq!(report.failures[0].error, "provider_error");
    assert_eq!(report.failures[1].error, "circuit_breaker_open");
    assert_eq!(provider.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_breaker_opens_after_ten_failures_and_recovers() {
    let provider = Arc::new(ScriptedProvider::failing());
    let (runtime, store) = runtime(app_config(), provider.clone());
    let dispatcher = runtime.dispatcher.clone();
    let ctx = SendContext::new(EmailType::Test);

    for _ in 0..10 {
        let result = dispatcher
            .send("user@example.com", "Subject", "<p>Body</p>", None, &ctx)
            .await;
        assert_eq!(result.reason, DispatchReason::ProviderError);
        assert_eq!(result.retryable, Some(true));
    }

    let rejected = dispatcher
        .send("user@example.com", "Subject", "<p>Body</p>", None, &ctx)
        .await;
    assert_eq!(rejected.reason, DispatchReason::CircuitBreakerOpen);
    assert_eq!(provider.sent().len(), 10);
    assert_eq!(dispatcher.stats().rejected_by_breaker, 1);

    provider
        .script
        .lock()
        .unwrap()
        .push_back(Ok(ProviderReceipt { id: "msg_ok".into() }));
    tokio::time::advance(Duration::from_secs(300)).await;

    let recovered = dispatcher
        .send("user@example.com", "Subject", "<p>Body</p>", None, &ctx)
        .await;
    assert!(recovered.success);
    assert_eq!(recovered.message_id.as_deref(), Some("msg_ok"));

    let attempts = store.delivery_attempts();
    assert_eq!(attempts.len(), 11);
    assert_eq!(
        attempts.iter().filter(|a| a.status == DeliveryStatus::Failed).count(),
        10
    );
}
