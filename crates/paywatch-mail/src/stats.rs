//! In-memory dispatch counters.
//!
//! A best-effort mirror of the delivery log for cheap health reads. The log
//! remains authoritative.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::breaker::BreakerSnapshot;

#[derive(Debug, Default)]
pub(crate) struct DispatchStats {
    sent: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
}

impl DispatchStats {
    pub(crate) fn record_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> DispatchCounters {
        DispatchCounters {
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            rejected_by_breaker: self.rejected.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        self.sent.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
    }
}

/// Counter values since start-up or the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchCounters {
    /// Provider accepted the message.
    pub sent: u64,
    /// Provider call failed.
    pub failed: u64,
    /// Short-circuited by the open breaker.
    pub rejected_by_breaker: u64,
}

impl DispatchCounters {
    /// `sent / (sent + failed)` as a percentage.
    pub fn success_rate(&self) -> f64 {
        let attempted = self.sent + self.failed;
        if attempted == 0 {
            return 0.0;
        }
        ((self.sent as f64 / attempted as f64) * 10_000.0).round() / 100.0
    }
}

/// Health report of a dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchHealth {
    /// `email.enabled` from configuration.
    pub enabled: bool,
    /// Whether a usable API key is configured.
    pub configured: bool,
    /// Provider name.
    pub provider: String,
    pub breaker: BreakerSnapshot,
    pub counters: DispatchCounters,
    /// Send tokens left in the pacing bucket (`None` when unpaced).
    pub pacing_tokens: Option<u32>,
}

impl DispatchHealth {
    /// Healthy when sends can currently reach the provider.
    pub fn is_healthy(&self) -> bool {
        self.enabled && self.configured && self.breaker.reopens_in_ms.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_reset() {
        let stats = DispatchStats::default();
        stats.record_sent();
        stats.record_sent();
        stats.record_failed();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.sent, 2);
        assert_eq!(snapshot.success_rate(), 66.67);

        stats.reset();
        assert_eq!(stats.snapshot(), DispatchCounters::default());
    }
}
