//! Merchant credentials for the gateway.

use secrecy::SecretString;

use super::signer::RequestSigner;

/// Merchant id plus the signing key it authenticates with.
#[derive(Debug, Clone)]
pub struct MerchantCredentials {
    merchant_id: String,
    signer: RequestSigner,
}

impl MerchantCredentials {
    pub fn new(
        merchant_id: impl Into<String>,
        secret_key: SecretString,
        key_index: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            signer: RequestSigner::new(secret_key, key_index),
        }
    }

    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }
}
