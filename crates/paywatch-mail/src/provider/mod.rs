//! Email provider implementations.

pub mod resend;

pub use resend::ResendProvider;
