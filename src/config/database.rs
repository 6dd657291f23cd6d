//! PostgreSQL connection settings for the transaction store.

use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use super::error::ValidationError;

const MAX_POOL_SIZE: u32 = 100;

/// Connection settings for `PostgresTransactionStore`.
///
/// The whole section is optional; without it payments are kept in memory.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "DatabaseConfig::default_pool_size")]
    pub max_connections: u32,

    /// Seconds to wait for a free pooled connection.
    #[serde(default = "DatabaseConfig::default_acquire_secs")]
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    fn default_pool_size() -> u32 {
        10
    }

    fn default_acquire_secs() -> u64 {
        30
    }

    /// Builds a config for `url` with default pool settings.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: Self::default_pool_size(),
            acquire_timeout_secs: Self::default_acquire_secs(),
        }
    }

    /// Pool options carrying the configured size and acquire timeout.
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ValidationError::MissingRequired("database.url"));
        }
        if !["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| url.starts_with(scheme))
        {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if !(1..=MAX_POOL_SIZE).contains(&self.max_connections) {
            return Err(ValidationError::InvalidPoolSize);
        }
        Ok(())
    }
}
