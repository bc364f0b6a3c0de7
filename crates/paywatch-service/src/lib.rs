//! # paywatch-service
//!
//! The per-user notification pipeline: rule evaluators derive candidate
//! notifications from a user's financial state, the overdue detector finds
//! missed payments, and the dedup gate persists candidates without
//! duplicating open notifications.
//!
//! Services take their stores as `Arc<dyn ...>` at construction time.

pub mod calendar;
pub mod notification;

pub use notification::{
    AdmitOutcome, DedupGate, NotificationGenerator, NotificationRules, OverdueDetector,
    OverdueReport, UserRunSummary,
};
