//! Email delivery log entities.

pub mod model;
pub mod stats;
pub mod status;

pub use model::{DeliveryAttempt, DeliveryResolution, EmailType, NewDeliveryAttempt};
pub use stats::{DeliveryStats, DeliveryStatsFilter, DeliveryTotals, TypeDeliveryStats};
pub use status::DeliveryStatus;
