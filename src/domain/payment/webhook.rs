//! Gateway webhook verification.
//!
//! Notifications arrive as `{"response": "<base64>"}` with an `X-VERIFY`
//! header computed over the base64 string and the merchant secret (no
//! endpoint). Verification fails closed: a verifier without credentials, or
//! any internal error, rejects the notification.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use thiserror::Error;

use super::provider_response::ProviderResponse;
use super::signer::RequestSigner;

/// Errors that occur while accepting a webhook notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// No merchant secret is configured, so nothing can be verified.
    #[error("Webhook verification is not configured")]
    NotConfigured,

    /// The `X-VERIFY` header was absent.
    #[error("Missing signature")]
    MissingSignature,

    /// Checksum did not match the body.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Body was not base64-encoded JSON.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Verifies and decodes inbound gateway notifications.
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    signer: Option<RequestSigner>,
}

impl WebhookVerifier {
    /// Creates a verifier; `None` rejects every notification.
    pub fn new(signer: Option<RequestSigner>) -> Self {
        Self { signer }
    }

    /// Returns true only if `received_checksum` matches the base64 body.
    pub fn verify(&self, base64_body: &str, received_checksum: &str) -> bool {
        match &self.signer {
            Some(signer) => {
                let valid = signer.verify(base64_body, received_checksum);
                if !valid {
                    tracing::warn!("Webhook checksum mismatch");
                }
                valid
            }
            None => {
                tracing::warn!("Webhook rejected: merchant secret not configured");
                false
            }
        }
    }

    /// Decodes a base64 body into the raw JSON the gateway sent.
    fn decode_raw(&self, base64_body: &str) -> Result<Value, WebhookError> {
        let bytes = STANDARD
            .decode(base64_body.trim())
            .map_err(|e| WebhookError::Decode(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| WebhookError::Decode(e.to_string()))
    }

    /// Verifies the checksum, then decodes the body.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` - no merchant secret
    /// - `MissingSignature` - empty or absent header
    /// - `InvalidSignature` - checksum mismatch
    /// - `Decode` - body is not base64 JSON
    pub fn verify_and_decode(
        &self,
        base64_body: &str,
        received_checksum: Option<&str>,
    ) -> Result<(ProviderResponse, Value), WebhookError> {
        if self.signer.is_none() {
            tracing::warn!("Webhook rejected: merchant secret not configured");
            return Err(WebhookError::NotConfigured);
        }

        let checksum = received_checksum
            .filter(|c| !c.is_empty())
            .ok_or(WebhookError::MissingSignature)?;

        if !self.verify(base64_body, checksum) {
            return Err(WebhookError::InvalidSignature);
        }

        let raw = self.decode_raw(base64_body)?;
        Ok((ProviderResponse::decode(&raw), raw))
    }
}
