//! # paywatch-mail
//!
//! Outbound email for PayWatch. [`EmailDispatcher`] sends one message
//! through an [`EmailProvider`](paywatch_core::traits::EmailProvider),
//! guarded by a [`CircuitBreaker`], paced by a [`SendPacer`], and recorded
//! in the delivery log. [`RetryPolicy`] is the caller-side retry wrapper.

pub mod breaker;
pub mod classify;
pub mod dispatcher;
pub mod pacing;
pub mod provider;
pub mod retry;
pub mod stats;
pub mod templates;

pub use breaker::{BreakerSnapshot, BreakerState, CircuitBreaker};
pub use dispatcher::{DispatchReason, DispatchResult, EmailDispatcher, SendContext};
pub use pacing::SendPacer;
pub use provider::ResendProvider;
pub use retry::RetryPolicy;
pub use stats::{DispatchCounters, DispatchHealth};
pub use templates::{ComposedEmail, EmailComposer};
