//! Payment error taxonomy.

use thiserror::Error;

use super::status::TransactionStatus;
use crate::domain::foundation::{ErrorCode, ValidationError};

/// Errors raised by payment operations.
///
/// Gateway calls themselves report failures as [`GatewayResult`] values; these
/// variants appear where a workflow has to stop.
///
/// [`GatewayResult`]: super::GatewayResult
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaymentError {
    /// Merchant credentials are missing or unusable.
    #[error("Gateway configuration error: {0}")]
    Configuration(String),

    /// Gateway rejected the request in a way retrying cannot fix.
    #[error("Gateway rejected request ({code}): {message}")]
    PermanentGateway { code: String, message: String },

    /// Gateway could not be reached or kept failing until retries ran out.
    #[error("Gateway unavailable ({code}): {message}")]
    TransientGateway { code: String, message: String },

    /// Checksum on an inbound notification did not match.
    #[error("Verification failed: {0}")]
    VerificationFailure(String),

    /// Transaction store operation failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Requested status is not reachable from the current one.
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: TransactionStatus,
        to: TransactionStatus,
    },

    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No transaction with the given merchant transaction id.
    #[error("Transaction not found: {0}")]
    NotFound(String),

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    pub fn configuration(message: impl Into<String>) -> Self {
        PaymentError::Configuration(message.into())
    }

    pub fn invalid_transition(from: TransactionStatus, to: TransactionStatus) -> Self {
        PaymentError::InvalidTransition { from, to }
    }

    pub fn not_found(merchant_transaction_id: impl Into<String>) -> Self {
        PaymentError::NotFound(merchant_transaction_id.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        PaymentError::Store(message.into())
    }

    /// Machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PaymentError::Configuration(_) => ErrorCode::ConfigError,
            PaymentError::PermanentGateway { .. } => ErrorCode::PermanentGatewayError,
            PaymentError::TransientGateway { .. } => ErrorCode::TransientGatewayError,
            PaymentError::VerificationFailure(_) => ErrorCode::VerificationFailed,
            PaymentError::Store(_) => ErrorCode::StoreError,
            PaymentError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            PaymentError::Validation(_) => ErrorCode::ValidationFailed,
            PaymentError::NotFound(_) => ErrorCode::TransactionNotFound,
            PaymentError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Returns true if the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::TransientGateway { .. } | PaymentError::Store(_)
        )
    }
}
