//! Immediate emails for newly created high-priority notifications.

use std::sync::Arc;

use tracing;

use paywatch_database::RecipientSource;
use paywatch_entity::delivery::EmailType;
use paywatch_entity::notification::{Notification, NotificationPriority};
use paywatch_mail::{EmailComposer, EmailDispatcher, RetryPolicy, SendContext};

/// Sends critical alerts through the shared dispatcher.
#[derive(Debug, Clone)]
pub struct CriticalAlertSender {
    recipients: Arc<dyn RecipientSource>,
    dispatcher: Arc<EmailDispatcher>,
    composer: EmailComposer,
    retry: RetryPolicy,
}

impl CriticalAlertSender {
    /// Create a new alert sender.
    pub fn new(
        recipients: Arc<dyn RecipientSource>,
        dispatcher: Arc<EmailDispatcher>,
        composer: EmailComposer,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            recipients,
            dispatcher,
            composer,
            retry,
        }
    }

    /// Alert on the high-priority notifications in `created`; returns the number sent.
    ///
    /// Failures are logged and never propagate.
    pub async fn send_for(&self, created: &[Notification]) -> usize {
        let critical: Vec<&Notification> = created
            .iter()
            .filter(|n| n.priority == NotificationPriority::High)
            .collect();
        let Some(first) = critical.first() else {
            return 0;
        };

        let recipient = match self.recipients.recipient(first.user_id).await {
            Ok(Some(r)) if r.wants_critical_alerts() => r,
            Ok(_) => return 0,
            Err(e) => {
                tracing::error!(user_id = %first.user_id, error = %e, "Failed to load alert recipient");
                return 0;
            }
        };

        let mut sent = 0;
        for notification in critical {
            let email = self
                .composer
                .critical_alert(notification, recipient.preferred_language());
            let ctx = SendContext::new(EmailType::CriticalAlert).for_user(recipient.user_id);
            let result = self
                .retry
                .send_with_retry(
                    &self.dispatcher,
                    &recipient.email,
                    &email.subject,
                    &email.html,
                    Some(&email.text),
                    ctx,
                )
                .await;
            if result.success {
                sent += 1;
            } else {
                tracing::warn!(
                    user_id = %recipient.user_id,
                    notification_id = %notification.id,
                    reason = result.reason.as_str(),
                    "Critical alert not delivered"
                );
            }
        }
        sent
    }
}
