//! Initiation payload construction and encoding.
//!
//! The payload is serialized as JSON with a fixed field order (absent optionals
//! omitted) and then base64-encoded. The checksum is computed over the encoded
//! string, so the encoding must be byte-stable for identical intents.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use super::intent::{DeviceContext, PaymentIntent};

/// Redirect mode sent with every initiation.
pub const REDIRECT_MODE: &str = "REDIRECT";

/// Instrument type for the provider-hosted payment page.
pub const PAY_PAGE_INSTRUMENT: &str = "PAY_PAGE";

/// Payment instrument descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstrument {
    #[serde(rename = "type")]
    pub kind: String,
}

impl PaymentInstrument {
    pub fn pay_page() -> Self {
        Self {
            kind: PAY_PAGE_INSTRUMENT.to_string(),
        }
    }
}

/// Body of a `/pg/v1/pay` request before encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiationPayload {
    pub merchant_id: String,
    pub merchant_transaction_id: String,
    pub merchant_user_id: String,
    pub amount: i64,
    pub redirect_url: String,
    pub redirect_mode: String,
    pub callback_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_context: Option<DeviceContext>,
    pub payment_instrument: PaymentInstrument,
}

impl InitiationPayload {
    /// Serializes to canonical JSON and base64-encodes it.
    pub fn encode(&self) -> Result<EncodedPayload, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(EncodedPayload(STANDARD.encode(json)))
    }
}

/// Base64 form of a payload; this is what gets signed and transmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload(String);

impl EncodedPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Assembles the initiation payload for `intent` under `merchant_id`.
pub fn build_initiation_payload(intent: &PaymentIntent, merchant_id: &str) -> InitiationPayload {
    InitiationPayload {
        merchant_id: merchant_id.to_string(),
        merchant_transaction_id: intent.merchant_transaction_id().to_string(),
        merchant_user_id: intent.merchant_user_id().to_string(),
        amount: intent.amount(),
        redirect_url: intent.redirect_url().to_string(),
        redirect_mode: REDIRECT_MODE.to_string(),
        callback_url: intent.callback_url().to_string(),
        mobile_number: intent.mobile_number().map(str::to_string),
        device_context: intent.device_context().cloned(),
        payment_instrument: PaymentInstrument::pay_page(),
    }
}
