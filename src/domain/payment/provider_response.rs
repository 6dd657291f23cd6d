//! Typed decoding of gateway response envelopes.
//!
//! Every gateway response (and every webhook body, once base64-decoded) shares
//! the envelope `{ success, code, message, data }`. The shape of `data` depends
//! on the call, so the envelope is decoded into [`ProviderResponse`] rather than
//! accessed field by field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::status::TransactionStatus;

/// Error codes the gateway documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownErrorCode {
    BadRequest,
    InvalidMerchant,
    DuplicateTransaction,
    AuthorizationFailed,
    InternalServerError,
    TransactionNotFound,
    PaymentError,
    PaymentDeclined,
    TimedOut,
}

impl KnownErrorCode {
    pub fn parse(code: &str) -> Option<Self> {
        let known = match code {
            "BAD_REQUEST" => KnownErrorCode::BadRequest,
            "INVALID_MERCHANT" => KnownErrorCode::InvalidMerchant,
            "DUPLICATE_TRANSACTION" => KnownErrorCode::DuplicateTransaction,
            "AUTHORIZATION_FAILED" => KnownErrorCode::AuthorizationFailed,
            "INTERNAL_SERVER_ERROR" => KnownErrorCode::InternalServerError,
            "TRANSACTION_NOT_FOUND" => KnownErrorCode::TransactionNotFound,
            "PAYMENT_ERROR" => KnownErrorCode::PaymentError,
            "PAYMENT_DECLINED" => KnownErrorCode::PaymentDeclined,
            "TIMED_OUT" => KnownErrorCode::TimedOut,
            _ => return None,
        };
        Some(known)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KnownErrorCode::BadRequest => "BAD_REQUEST",
            KnownErrorCode::InvalidMerchant => "INVALID_MERCHANT",
            KnownErrorCode::DuplicateTransaction => "DUPLICATE_TRANSACTION",
            KnownErrorCode::AuthorizationFailed => "AUTHORIZATION_FAILED",
            KnownErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
            KnownErrorCode::TransactionNotFound => "TRANSACTION_NOT_FOUND",
            KnownErrorCode::PaymentError => "PAYMENT_ERROR",
            KnownErrorCode::PaymentDeclined => "PAYMENT_DECLINED",
            KnownErrorCode::TimedOut => "TIMED_OUT",
        }
    }

    /// Codes that make re-submitting the same initiation pointless.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            KnownErrorCode::BadRequest
                | KnownErrorCode::InvalidMerchant
                | KnownErrorCode::DuplicateTransaction
        )
    }
}

/// Payment state as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderPaymentState {
    Completed,
    Failed,
    Pending,
    #[serde(other)]
    Unknown,
}

impl ProviderPaymentState {
    /// Maps the gateway's state onto a transaction status, if it names one.
    pub fn transaction_status(&self) -> Option<TransactionStatus> {
        match self {
            ProviderPaymentState::Completed => Some(TransactionStatus::Success),
            ProviderPaymentState::Failed => Some(TransactionStatus::Failed),
            ProviderPaymentState::Pending => Some(TransactionStatus::Pending),
            ProviderPaymentState::Unknown => None,
        }
    }
}

/// Where the payer must be sent to finish on the hosted page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectInfo {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// Transaction details carried by status responses and webhooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    pub merchant_transaction_id: String,
    #[serde(rename = "transactionId", default)]
    pub provider_transaction_id: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    pub state: ProviderPaymentState,
    #[serde(default)]
    pub response_code: Option<String>,
    #[serde(default)]
    pub payment_instrument: Option<Value>,
}

impl TransactionDetails {
    /// Instrument type used by the payer, e.g. `UPI` or `CARD`.
    pub fn payment_method(&self) -> Option<String> {
        self.payment_instrument
            .as_ref()
            .and_then(|instrument| instrument.get("type"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitiationData {
    #[serde(default)]
    merchant_transaction_id: Option<String>,
    instrument_response: InstrumentResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentResponse {
    redirect_info: RedirectInfo,
}

/// A decoded gateway response.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResponse {
    /// Initiation accepted; payer must be redirected.
    SuccessWithRedirect {
        code: String,
        message: String,
        merchant_transaction_id: Option<String>,
        redirect: RedirectInfo,
    },

    /// Request succeeded and reports a transaction state.
    SuccessWithState {
        code: String,
        message: String,
        details: TransactionDetails,
    },

    /// Failure with a documented code.
    KnownError {
        code: KnownErrorCode,
        message: String,
        details: Option<TransactionDetails>,
    },

    /// Failure with a code this client does not recognize.
    UnknownError {
        code: String,
        message: String,
        details: Option<TransactionDetails>,
    },

    /// Body is not a gateway envelope, or a success without usable data.
    Unrecognized { raw: Value },
}

impl ProviderResponse {
    /// Decodes a response body already parsed as JSON.
    pub fn decode(raw: &Value) -> Self {
        let envelope = match Envelope::deserialize(raw) {
            Ok(envelope) => envelope,
            Err(_) => return ProviderResponse::Unrecognized { raw: raw.clone() },
        };

        let details = envelope
            .data
            .as_ref()
            .and_then(|data| TransactionDetails::deserialize(data).ok());

        if envelope.success {
            if let Some(details) = details {
                return ProviderResponse::SuccessWithState {
                    code: envelope.code,
                    message: envelope.message,
                    details,
                };
            }

            let initiation = envelope
                .data
                .as_ref()
                .and_then(|data| InitiationData::deserialize(data).ok());

            return match initiation {
                Some(data) => ProviderResponse::SuccessWithRedirect {
                    code: envelope.code,
                    message: envelope.message,
                    merchant_transaction_id: data.merchant_transaction_id,
                    redirect: data.instrument_response.redirect_info,
                },
                None => ProviderResponse::Unrecognized { raw: raw.clone() },
            };
        }

        match KnownErrorCode::parse(&envelope.code) {
            Some(code) => ProviderResponse::KnownError {
                code,
                message: envelope.message,
                details,
            },
            None => ProviderResponse::UnknownError {
                code: envelope.code,
                message: envelope.message,
                details,
            },
        }
    }

    /// Decodes a response from its textual body.
    pub fn decode_str(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(raw) => Self::decode(&raw),
            Err(_) => ProviderResponse::Unrecognized {
                raw: Value::String(body.to_string()),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ProviderResponse::SuccessWithRedirect { .. } | ProviderResponse::SuccessWithState { .. }
        )
    }

    /// True for failures that must not be retried.
    pub fn is_permanent_failure(&self) -> bool {
        matches!(self, ProviderResponse::KnownError { code, .. } if code.is_permanent())
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ProviderResponse::SuccessWithRedirect { code, .. }
            | ProviderResponse::SuccessWithState { code, .. }
            | ProviderResponse::UnknownError { code, .. } => Some(code),
            ProviderResponse::KnownError { code, .. } => Some(code.as_str()),
            ProviderResponse::Unrecognized { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ProviderResponse::SuccessWithRedirect { message, .. }
            | ProviderResponse::SuccessWithState { message, .. }
            | ProviderResponse::KnownError { message, .. }
            | ProviderResponse::UnknownError { message, .. } => Some(message),
            ProviderResponse::Unrecognized { .. } => None,
        }
    }

    pub fn details(&self) -> Option<&TransactionDetails> {
        match self {
            ProviderResponse::SuccessWithState { details, .. } => Some(details),
            ProviderResponse::KnownError { details, .. }
            | ProviderResponse::UnknownError { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}
