//! Token bucket pacing for outbound sends.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Limits sends to a per-minute budget, waiting rather than rejecting.
#[derive(Debug)]
pub struct SendPacer {
    bucket: Option<Mutex<Bucket>>,
    capacity: f64,
    refill_per_sec: f64,
}

impl SendPacer {
    /// Create a pacer allowing `per_minute` sends; zero disables pacing.
    pub fn per_minute(per_minute: u32) -> Self {
        let capacity = per_minute as f64;
        Self {
            bucket: (per_minute > 0).then(|| {
                Mutex::new(Bucket {
                    tokens: capacity,
                    last_refill: Instant::now(),
                })
            }),
            capacity,
            refill_per_sec: capacity / 60.0,
        }
    }

    /// Wait until a send token is available and consume it.
    pub async fn acquire(&self) {
        let Some(bucket) = &self.bucket else {
            return;
        };

        loop {
            let wait = {
                let mut bucket = bucket.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
                bucket.last_refill = now;

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - bucket.tokens) / self.refill_per_sec)
            };
            tokio::time::sleep(wait).await;
        }
    }

    /// Tokens currently available, for health reporting.
    pub async fn available(&self) -> Option<u32> {
        let bucket = self.bucket.as_ref()?;
        let bucket = bucket.lock().await;
        let elapsed = Instant::now()
            .duration_since(bucket.last_refill)
            .as_secs_f64();
        Some((bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity) as u32)
    }
}
