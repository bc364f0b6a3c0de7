//! # paywatch-database
//!
//! Store traits consumed by the notification pipeline and the email
//! dispatcher, their PostgreSQL implementations, and an in-memory
//! implementation used by tests and dry runs.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{
    DeliveryLogStore, FinanceSource, NotificationStore, RecipientSource, Stores, UserSource,
};
