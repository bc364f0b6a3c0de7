//! Scheduled job configuration.

use serde::{Deserialize, Serialize};

/// Cron schedules for the daily jobs. Expressions use the six-field
/// `sec min hour day month weekday` form and are evaluated in local time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the scheduler starts at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// When the notification batch runs.
    #[serde(default = "default_notifications_cron")]
    pub daily_notifications_cron: String,
    /// Whether the daily digest email job is registered.
    #[serde(default = "default_true")]
    pub digest_enabled: bool,
    /// When the digest job runs.
    #[serde(default = "default_digest_cron")]
    pub daily_digest_cron: String,
    /// Whether overdue notifications created by the batch trigger a critical alert email.
    #[serde(default = "default_true")]
    pub critical_alerts_enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            daily_notifications_cron: default_notifications_cron(),
            digest_enabled: true,
            daily_digest_cron: default_digest_cron(),
            critical_alerts_enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_notifications_cron() -> String {
    "0 0 6 * * *".to_string()
}

fn default_digest_cron() -> String {
    "0 0 8 * * *".to_string()
}
