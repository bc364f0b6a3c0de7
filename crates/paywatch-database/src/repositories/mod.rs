//! PostgreSQL implementations of the store traits.

pub mod delivery_log;
pub mod finance;
pub mod notification;
pub mod user;

pub use delivery_log::DeliveryLogRepository;
pub use finance::FinanceRepository;
pub use notification::NotificationRepository;
pub use user::UserRepository;
