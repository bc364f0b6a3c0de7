//! Core traits defined in `paywatch-core` and implemented by other crates.

pub mod email;

pub use email::{EmailProvider, OutgoingEmail, ProviderError, ProviderReceipt};
