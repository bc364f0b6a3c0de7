//! Notification domain entities.

pub mod kind;
pub mod model;
pub mod payload;
pub mod priority;
pub mod related;

pub use kind::NotificationType;
pub use model::{NewNotification, Notification, NotificationUpdate};
pub use payload::NotificationPayload;
pub use priority::NotificationPriority;
pub use related::RelatedEntity;
