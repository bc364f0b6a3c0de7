//! Built-in job implementations.

pub mod alerts;
pub mod digest;
pub mod notification;

pub use alerts::CriticalAlertSender;
pub use digest::{DAILY_DIGEST, DailyDigestJob, DigestReport};
pub use notification::{BatchReport, DAILY_NOTIFICATIONS, DailyNotificationJob, UserFailure};
