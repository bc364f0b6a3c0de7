//! Outbound email configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// API key value shipped in sample environments; treated as "not configured".
pub const PLACEHOLDER_API_KEY: &str = "re_test_key_placeholder";

/// Email delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Master switch for outbound email.
    #[serde(default)]
    pub enabled: bool,
    /// Provider API key.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Provider API base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Sender address.
    #[serde(default = "default_from_email")]
    pub from_email: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Maximum recipients handled per digest batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Provider calls allowed per minute (0 disables pacing).
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
    /// Additional attempts a caller may make after a retryable failure.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Base delay between caller-side retries, in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Consecutive failures that open the circuit breaker.
    #[serde(default = "default_breaker_threshold")]
    pub circuit_breaker_threshold: u32,
    /// Seconds the breaker stays open before the next send is attempted.
    #[serde(default = "default_breaker_reset")]
    pub circuit_breaker_reset_timeout_seconds: u64,
    /// Per-request timeout for provider calls, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            api_base_url: default_api_base_url(),
            from_email: default_from_email(),
            from_name: default_from_name(),
            batch_size: default_batch_size(),
            rate_limit_per_minute: default_rate_limit(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay(),
            circuit_breaker_threshold: default_breaker_threshold(),
            circuit_breaker_reset_timeout_seconds: default_breaker_reset(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl EmailConfig {
    /// Whether a usable API key is present.
    pub fn api_key_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty() && k != PLACEHOLDER_API_KEY)
            .unwrap_or(false)
    }

    /// Whether sends should reach the provider at all.
    pub fn is_active(&self) -> bool {
        self.enabled && self.api_key_configured()
    }

    /// The `From:` header value, e.g. `Budget App <notifications@budgetapp.site>`.
    pub fn sender(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    /// Breaker cool-down as a [`Duration`].
    pub fn reset_timeout(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_reset_timeout_seconds)
    }

    /// Caller-side retry base delay as a [`Duration`].
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Provider request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn default_api_base_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_from_email() -> String {
    "notifications@budgetapp.site".to_string()
}

fn default_from_name() -> String {
    "Budget App".to_string()
}

fn default_batch_size() -> usize {
    50
}

fn default_rate_limit() -> u32 {
    100
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    2000
}

fn default_breaker_threshold() -> u32 {
    10
}

fn default_breaker_reset() -> u64 {
    300
}

fn default_request_timeout() -> u64 {
    10
}
