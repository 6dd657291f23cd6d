//! Checksum signing for gateway requests and webhook bodies.
//!
//! The gateway authenticates every call with an `X-VERIFY` header of the form
//!
//! ```text
//! hex(SHA256(payload || endpoint || secret)) + "###" + keyIndex
//! ```
//!
//! Webhook bodies use the same scheme with an empty endpoint. The secret never
//! leaves this module; only the digest and the key index are transmitted.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Separator between the hex digest and the key index.
pub const CHECKSUM_SEPARATOR: &str = "###";

/// A request ready to be sent: encoded body, endpoint path and its checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Base64 payload, empty for body-less calls.
    pub payload: String,
    /// Endpoint path the checksum is bound to, e.g. `/pg/v1/pay`.
    pub endpoint: String,
    /// Value for the `X-VERIFY` header.
    pub checksum: String,
}

/// Computes and verifies gateway checksums for one merchant key.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    secret_key: SecretString,
    key_index: String,
}

impl RequestSigner {
    pub fn new(secret_key: SecretString, key_index: impl Into<String>) -> Self {
        Self {
            secret_key,
            key_index: key_index.into(),
        }
    }

    pub fn key_index(&self) -> &str {
        &self.key_index
    }

    /// Returns the checksum for `payload` bound to `endpoint`.
    pub fn sign(&self, payload: &str, endpoint: &str) -> String {
        format!(
            "{}{}{}",
            self.digest(payload, endpoint),
            CHECKSUM_SEPARATOR,
            self.key_index
        )
    }

    /// Signs `payload` for `endpoint` and packages both with the checksum.
    pub fn sign_request(&self, payload: impl Into<String>, endpoint: impl Into<String>) -> SignedRequest {
        let payload = payload.into();
        let endpoint = endpoint.into();
        let checksum = self.sign(&payload, &endpoint);
        SignedRequest {
            payload,
            endpoint,
            checksum,
        }
    }

    /// Verifies an endpoint-less checksum, as sent with webhook bodies.
    pub fn verify(&self, payload: &str, checksum: &str) -> bool {
        self.verify_request(payload, "", checksum)
    }

    /// Verifies a checksum bound to `endpoint`.
    pub fn verify_request(&self, payload: &str, endpoint: &str, checksum: &str) -> bool {
        let expected = self.sign(payload, endpoint);
        constant_time_compare(expected.as_bytes(), checksum.as_bytes())
    }

    fn digest(&self, payload: &str, endpoint: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(payload.as_bytes());
        hasher.update(endpoint.as_bytes());
        hasher.update(self.secret_key.expose_secret().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Length is not secret; contents are compared without early exit.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
