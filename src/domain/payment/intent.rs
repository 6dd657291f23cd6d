//! Caller-supplied payment intent.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MerchantTransactionId, ValidationError};

/// Device hints forwarded to the hosted payment page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceContext {
    #[serde(rename = "deviceOS")]
    pub device_os: String,
}

/// Everything needed to start one payment attempt.
///
/// # Invariants
///
/// - `amount` is strictly positive, in the smallest currency unit
/// - `merchant_transaction_id` is unique per attempt and doubles as the idempotency key
/// - user id and both URLs are non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    amount: i64,
    merchant_transaction_id: MerchantTransactionId,
    merchant_user_id: String,
    redirect_url: String,
    callback_url: String,
    mobile_number: Option<String>,
    device_context: Option<DeviceContext>,
}

impl PaymentIntent {
    /// Validates and creates a new intent without optional fields.
    pub fn new(
        amount: i64,
        merchant_transaction_id: MerchantTransactionId,
        merchant_user_id: impl Into<String>,
        redirect_url: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if amount <= 0 {
            return Err(ValidationError::not_positive("amount", amount));
        }

        let merchant_user_id = merchant_user_id.into();
        if merchant_user_id.trim().is_empty() {
            return Err(ValidationError::empty_field("merchant_user_id"));
        }

        let redirect_url = redirect_url.into();
        if redirect_url.trim().is_empty() {
            return Err(ValidationError::empty_field("redirect_url"));
        }

        let callback_url = callback_url.into();
        if callback_url.trim().is_empty() {
            return Err(ValidationError::empty_field("callback_url"));
        }

        Ok(Self {
            amount,
            merchant_transaction_id,
            merchant_user_id,
            redirect_url,
            callback_url,
            mobile_number: None,
            device_context: None,
        })
    }

    /// Attaches the payer's mobile number.
    pub fn with_mobile_number(mut self, mobile_number: impl Into<String>) -> Result<Self, ValidationError> {
        let mobile_number = mobile_number.into();
        if mobile_number.is_empty() || !mobile_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::invalid_format(
                "mobile_number",
                "must contain digits only",
            ));
        }
        self.mobile_number = Some(mobile_number);
        Ok(self)
    }

    /// Attaches device hints.
    pub fn with_device_context(mut self, device_context: DeviceContext) -> Self {
        self.device_context = Some(device_context);
        self
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn merchant_transaction_id(&self) -> &MerchantTransactionId {
        &self.merchant_transaction_id
    }

    pub fn merchant_user_id(&self) -> &str {
        &self.merchant_user_id
    }

    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }

    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    pub fn mobile_number(&self) -> Option<&str> {
        self.mobile_number.as_deref()
    }

    pub fn device_context(&self) -> Option<&DeviceContext> {
        self.device_context.as_ref()
    }
}
