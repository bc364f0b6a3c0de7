//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod database;
pub mod email;
pub mod logging;
pub mod rules;
pub mod scheduler;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::email::EmailConfig;
pub use self::logging::LoggingConfig;
pub use self::rules::RulesConfig;
pub use self::scheduler::SchedulerConfig;

use crate::error::AppError;

/// Environment variable prefix for overrides, e.g. `PAYWATCH__EMAIL__ENABLED=true`.
pub const ENV_PREFIX: &str = "PAYWATCH";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Outbound email settings.
    #[serde(default)]
    pub email: EmailConfig,
    /// Scheduled job settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Notification rule settings.
    #[serde(default)]
    pub rules: RulesConfig,
}

impl AppConfig {
    /// Load configuration for an environment.
    ///
    /// Merges `config/default.toml` with `config/{env}.toml` and
    /// environment variables prefixed with `PAYWATCH__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(environment_source())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        Self::deserialize_validated(config)
    }

    /// Load configuration from a single explicit file plus environment overrides.
    pub fn load_file(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(true))
            .add_source(environment_source())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config '{path}': {e}")))?;

        Self::deserialize_validated(config)
    }

    fn deserialize_validated(config: config::Config) -> Result<Self, AppError> {
        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.url.trim().is_empty() {
            return Err(AppError::configuration("database.url must not be empty"));
        }
        if self.email.circuit_breaker_threshold == 0 {
            return Err(AppError::configuration(
                "email.circuit_breaker_threshold must be at least 1",
            ));
        }
        self.rules.validate()
    }
}

fn environment_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> AppConfig {
        let config = config::Config::builder()
            .add_source(config::File::from_str(
                "[database]\nurl = \"postgres://localhost/paywatch\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        AppConfig::deserialize_validated(config).unwrap()
    }

    #[test]
    fn test_minimal_file_fills_defaults() {
        let config = minimal();
        assert_eq!(config.email.circuit_breaker_threshold, 10);
        assert_eq!(config.email.circuit_breaker_reset_timeout_seconds, 300);
        assert_eq!(config.scheduler.daily_notifications_cron, "0 0 6 * * *");
        assert_eq!(config.rules.budget_thresholds.len(), 7);
        assert!(!config.email.enabled);
    }

    #[test]
    fn test_zero_breaker_threshold_rejected() {
        let mut config = minimal();
        config.email.circuit_breaker_threshold = 0;
        assert!(config.validate().is_err());
    }
}
