//! Consecutive-failure circuit breaker for the email provider.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

/// Whether sends are currently allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakerState {
    /// Sends go to the provider.
    Closed,
    /// Sends are rejected without calling the provider.
    Open,
}

/// Point-in-time view of the breaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakerSnapshot {
    pub state: BreakerState,
    pub consecutive_failures: u32,
    pub failure_threshold: u32,
    /// Time left until the breaker closes, when open.
    pub reopens_in_ms: Option<u64>,
}

#[derive(Debug, Default)]
struct BreakerInner {
    consecutive_failures: u32,
    open_until: Option<Instant>,
}

/// Process-wide breaker shared by every caller of a dispatcher.
///
/// Opens once `failure_threshold` consecutive failures have been recorded
/// and stays open for `reset_timeout`. The first check after the timeout
/// closes it without clearing the failure count, so a failing trial send
/// reopens it immediately. Any success clears the count.
#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<BreakerInner>,
    failure_threshold: u32,
    reset_timeout: Duration,
}

impl CircuitBreaker {
    /// Create a closed breaker.
    pub fn new(failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(BreakerInner::default()),
            failure_threshold: failure_threshold.max(1),
            reset_timeout,
        }
    }

    /// Returns `true` when a send may proceed.
    pub async fn check(&self) -> bool {
        let mut inner = self.inner.lock().await;
        if let Some(until) = inner.open_until {
            if Instant::now() < until {
                return false;
            }
            inner.open_until = None;
            info!(
                consecutive_failures = inner.consecutive_failures,
                "Email circuit breaker closed after reset timeout"
            );
        }
        true
    }

    /// Record a successful provider call.
    pub async fn record_success(&self) {
        let mut inner = self.inner.lock().await;
        inner.consecutive_failures = 0;
        inner.open_until = None;
    }

    /// Record a failed provider call; returns `true` if this opened the breaker.
    pub async fn record_failure(&self) -> bool {
        let mut inner = self.inner.lock().await;
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
        if inner.consecutive_failures >= self.failure_threshold && inner.open_until.is_none() {
            inner.open_until = Some(Instant::now() + self.reset_timeout);
            warn!(
                consecutive_failures = inner.consecutive_failures,
                reset_timeout_secs = self.reset_timeout.as_secs(),
                "Email circuit breaker opened"
            );
            return true;
        }
        false
    }

    /// Current state without transitioning it.
    pub async fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.inner.lock().await;
        let now = Instant::now();
        let remaining = inner
            .open_until
            .filter(|until| now < *until)
            .map(|until| until - now);
        BreakerSnapshot {
            state: if remaining.is_some() {
                BreakerState::Open
            } else {
                BreakerState::Closed
            },
            consecutive_failures: inner.consecutive_failures,
            failure_threshold: self.failure_threshold,
            reopens_in_ms: remaining.map(|d| d.as_millis() as u64),
        }
    }
}
