//! Outcome of a gateway call as seen by callers.

use serde::Serialize;
use serde_json::{json, Value};

use super::provider_response::{KnownErrorCode, ProviderResponse, RedirectInfo, TransactionDetails};
use crate::domain::foundation::ErrorCode;

/// Structured data attached to a gateway result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GatewayData {
    Redirect(RedirectInfo),
    Transaction(TransactionDetails),
}

/// Success flag, provider code and message, optional data, and the raw body.
///
/// Failures are values, not errors: callers branch on `success`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayResult {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub data: Option<GatewayData>,
    /// Response body exactly as received, kept for audit.
    pub raw: Value,
}

/// Code reported when the gateway answered with something this client cannot read.
pub const UNRECOGNIZED_RESPONSE_CODE: &str = "UNRECOGNIZED_RESPONSE";

impl GatewayResult {
    /// Builds a result from a decoded response and the body it came from.
    pub fn from_response(response: ProviderResponse, raw: Value) -> Self {
        match response {
            ProviderResponse::SuccessWithRedirect {
                code,
                message,
                redirect,
                ..
            } => Self {
                success: true,
                code,
                message,
                data: Some(GatewayData::Redirect(redirect)),
                raw,
            },
            ProviderResponse::SuccessWithState {
                code,
                message,
                details,
            } => Self {
                success: true,
                code,
                message,
                data: Some(GatewayData::Transaction(details)),
                raw,
            },
            ProviderResponse::KnownError {
                code,
                message,
                details,
            } => Self {
                success: false,
                code: code.as_str().to_string(),
                message,
                data: details.map(GatewayData::Transaction),
                raw,
            },
            ProviderResponse::UnknownError {
                code,
                message,
                details,
            } => Self {
                success: false,
                code,
                message,
                data: details.map(GatewayData::Transaction),
                raw,
            },
            ProviderResponse::Unrecognized { .. } => Self {
                success: false,
                code: UNRECOGNIZED_RESPONSE_CODE.to_string(),
                message: "Gateway returned an unrecognized response".to_string(),
                data: None,
                raw,
            },
        }
    }

    /// A failure produced locally, without a gateway response.
    pub fn local_failure(code: ErrorCode, message: impl Into<String>) -> Self {
        let code = code.to_string();
        let message = message.into();
        let raw = json!({ "success": false, "code": code, "message": message });
        Self {
            success: false,
            code,
            message,
            data: None,
            raw,
        }
    }

    /// True for failures carrying a code that retrying cannot fix.
    pub fn is_permanent_failure(&self) -> bool {
        !self.success
            && KnownErrorCode::parse(&self.code).map_or(false, |code| code.is_permanent())
    }

    /// Hosted payment page URL, for accepted initiations.
    pub fn redirect_url(&self) -> Option<&str> {
        match &self.data {
            Some(GatewayData::Redirect(info)) => Some(info.url.as_str()),
            _ => None,
        }
    }

    /// Transaction details, for status checks.
    pub fn transaction_details(&self) -> Option<&TransactionDetails> {
        match &self.data {
            Some(GatewayData::Transaction(details)) => Some(details),
            _ => None,
        }
    }
}
