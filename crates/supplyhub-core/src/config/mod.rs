//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files plus `SUPPLYHUB__`-prefixed environment variables. Each
//! sub-module represents a logical configuration section.

pub mod app;
pub mod auth;
pub mod database;
pub mod delivery;
pub mod logging;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::database::{DatabaseConfig, StorageBackend};
pub use self::delivery::{DeliveryConfig, MAX_BACKOFF_MS, RetryScope, WebhookConfig};
pub use self::logging::LoggingConfig;
pub use self::worker::{MAX_TASK_LEASE_SECONDS, WorkerConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// Every section has defaults, so an empty configuration is valid for
/// local development.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Token validation settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Delivery and retry settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,
    /// Background worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Merges `config/default.toml`, an environment-specific overlay
    /// `config/{env}.toml`, and environment variables such as
    /// `SUPPLYHUB__DATABASE__URL`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SUPPLYHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the service misbehave at runtime.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.delivery.max_retries < 0 {
            return Err(AppError::configuration(
                "delivery.max_retries must not be negative",
            ));
        }
        if self.delivery.backoff_base_ms == 0 {
            return Err(AppError::configuration(
                "delivery.backoff_base_ms must be greater than zero",
            ));
        }
        if self.delivery.backoff_max_ms > MAX_BACKOFF_MS {
            return Err(AppError::configuration(format!(
                "delivery.backoff_max_ms must not exceed {MAX_BACKOFF_MS}"
            )));
        }
        if self.worker.task_lease_seconds > MAX_TASK_LEASE_SECONDS {
            return Err(AppError::configuration(format!(
                "worker.task_lease_seconds must not exceed {MAX_TASK_LEASE_SECONDS}"
            )));
        }
        if self.worker.concurrency == 0 {
            return Err(AppError::configuration(
                "worker.concurrency must be greater than zero",
            ));
        }
        if self.auth.jwt_secret.is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must be set"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.delivery.max_retries, 3);
        assert_eq!(config.delivery.backoff_base_ms, 1000);
        assert_eq!(config.delivery.retry_scope, RetryScope::FailedOnly);
        assert_eq!(config.database.backend, StorageBackend::Postgres);
        assert_eq!(config.delivery.webhook.timeout_seconds, 10);
    }

    #[test]
    fn rejects_zero_concurrency() {
        let mut config = AppConfig::default();
        config.worker.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unbounded_delays() {
        let mut config = AppConfig::default();
        config.delivery.backoff_max_ms = u64::MAX;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.worker.task_lease_seconds = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserializes_partial_toml() {
        let raw = r#"
            [database]
            backend = "memory"

            [delivery]
            max_retries = 5
            retry_scope = "all_channels"
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .unwrap();

        assert_eq!(config.database.backend, StorageBackend::Memory);
        assert_eq!(config.delivery.max_retries, 5);
        assert_eq!(config.delivery.retry_scope, RetryScope::AllChannels);
        assert_eq!(config.worker.concurrency, 4);
    }
}
