//! Application configuration module
//!
//! Type-safe configuration loaded once at startup from environment variables
//! using the `config` and `dotenvy` crates. Variables use the
//! `PAYMENT_GATEWAY` prefix and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use payment_gateway_client::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Gateway base URL: {}", config.gateway.base_url());
//! ```

mod database;
mod error;
mod gateway;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use gateway::{GatewayConfig, GatewayEnvironment, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
pub use server::ServerConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Merchant credentials and gateway client tuning
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// PostgreSQL store; in-memory store when absent
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PAYMENT_GATEWAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `PAYMENT_GATEWAY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PAYMENT_GATEWAY__GATEWAY__MERCHANT_ID=M1` -> `gateway.merchant_id = "M1"`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PAYMENT_GATEWAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Missing gateway credentials are not an error here; the gateway simply
    /// stays disabled.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.gateway.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "PAYMENT_GATEWAY__GATEWAY__MERCHANT_ID",
        "PAYMENT_GATEWAY__GATEWAY__SECRET_KEY",
        "PAYMENT_GATEWAY__GATEWAY__KEY_INDEX",
        "PAYMENT_GATEWAY__GATEWAY__ENVIRONMENT",
        "PAYMENT_GATEWAY__GATEWAY__STATUS_MAX_RETRIES",
        "PAYMENT_GATEWAY__SERVER__PORT",
        "PAYMENT_GATEWAY__DATABASE__URL",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_no_environment_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        let config = AppConfig::load().unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.gateway.base_url(), SANDBOX_BASE_URL);
        assert!(!config.gateway.is_configured());
        assert!(config.database.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_gateway_section() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("PAYMENT_GATEWAY__GATEWAY__MERCHANT_ID", "MERCHANT1");
        env::set_var("PAYMENT_GATEWAY__GATEWAY__SECRET_KEY", "salt");
        env::set_var("PAYMENT_GATEWAY__GATEWAY__KEY_INDEX", "2");
        env::set_var("PAYMENT_GATEWAY__GATEWAY__ENVIRONMENT", "production");
        env::set_var("PAYMENT_GATEWAY__GATEWAY__STATUS_MAX_RETRIES", "5");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.gateway.is_configured());
        assert_eq!(config.gateway.key_index, "2");
        assert_eq!(config.gateway.base_url(), PRODUCTION_BASE_URL);
        assert_eq!(config.gateway.status_max_retries, 5);
    }

    #[test]
    fn test_load_database_section() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("PAYMENT_GATEWAY__DATABASE__URL", "postgresql://test@localhost/payments");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        let database = config.database.unwrap();
        assert_eq!(database.url, "postgresql://test@localhost/payments");
        assert_eq!(database.max_connections, 10);
    }

    #[test]
    fn test_custom_server_port() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("PAYMENT_GATEWAY__SERVER__PORT", "3000");
        let result = AppConfig::load();
        clear_env();

        assert_eq!(result.unwrap().server.port, 3000);
    }

    #[test]
    fn test_validate_rejects_bad_database_url() {
        let config = AppConfig {
            database: Some(DatabaseConfig::for_url("mysql://localhost/x")),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidDatabaseUrl));
    }
}
