//! Notification detection and persistence.

pub mod gate;
pub mod generator;
pub mod overdue;
pub mod rules;

pub use gate::{AdmitOutcome, DedupGate};
pub use generator::{NotificationGenerator, UserRunSummary};
pub use overdue::{OverdueDetector, OverdueItem, OverdueReport};
pub use rules::NotificationRules;
