//! Gateway configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::payment::{MerchantCredentials, RequestSigner, WebhookVerifier};
use crate::ports::{DEFAULT_INITIATE_RETRIES, DEFAULT_STATUS_RETRIES};

/// Production API base URL.
pub const PRODUCTION_BASE_URL: &str = "https://api.phonepe.com/apis/hermes";

/// Sandbox API base URL.
pub const SANDBOX_BASE_URL: &str = "https://api-preprod.phonepe.com/apis/pg-sandbox";

/// Which gateway deployment to talk to.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GatewayEnvironment {
    Production,
    #[default]
    Sandbox,
}

/// Merchant credentials and client tuning.
///
/// Missing merchant id or secret key leaves the gateway disabled rather than
/// failing startup.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub merchant_id: Option<String>,

    /// Salt key issued with the merchant account
    pub secret_key: Option<SecretString>,

    #[serde(default = "default_key_index")]
    pub key_index: String,

    #[serde(default)]
    pub environment: GatewayEnvironment,

    /// Overrides the environment's base URL (tests, proxies)
    pub base_url: Option<String>,

    /// Per-attempt HTTP deadline in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_initiate_retries")]
    pub initiate_max_retries: u32,

    #[serde(default = "default_status_retries")]
    pub status_max_retries: u32,
}

impl GatewayConfig {
    /// Base URL for the configured environment, unless overridden.
    pub fn base_url(&self) -> &str {
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.is_empty()) {
            return url;
        }
        match self.environment {
            GatewayEnvironment::Production => PRODUCTION_BASE_URL,
            GatewayEnvironment::Sandbox => SANDBOX_BASE_URL,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Credentials, or `None` if merchant id or secret is missing or blank.
    pub fn credentials(&self) -> Option<MerchantCredentials> {
        let merchant_id = self.merchant_id.as_deref().filter(|id| !id.trim().is_empty())?;
        let secret = self.secret()?;
        Some(MerchantCredentials::new(
            merchant_id,
            secret,
            self.key_index.clone(),
        ))
    }

    /// Verifier for inbound webhooks; rejects everything when no secret is set.
    pub fn webhook_verifier(&self) -> WebhookVerifier {
        WebhookVerifier::new(
            self.secret()
                .map(|secret| RequestSigner::new(secret, self.key_index.clone())),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }

    fn secret(&self) -> Option<SecretString> {
        self.secret_key
            .as_ref()
            .filter(|s| !s.expose_secret().is_empty())
            .cloned()
    }

    /// Validate gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.key_index.trim().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY__KEY_INDEX"));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.is_empty()) {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ValidationError::InvalidGatewayUrl);
            }
        }
        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            merchant_id: None,
            secret_key: None,
            key_index: default_key_index(),
            environment: GatewayEnvironment::default(),
            base_url: None,
            request_timeout_secs: default_request_timeout(),
            initiate_max_retries: default_initiate_retries(),
            status_max_retries: default_status_retries(),
        }
    }
}

fn default_key_index() -> String {
    "1".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_initiate_retries() -> u32 {
    DEFAULT_INITIATE_RETRIES
}

fn default_status_retries() -> u32 {
    DEFAULT_STATUS_RETRIES
}
