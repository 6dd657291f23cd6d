//! HTTP DTOs (Data Transfer Objects) for payment endpoints.
//!
//! These types define the JSON request/response structure for the payment API.
//! They serve as the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::{
    HandlePaymentWebhookResult, InitiatePaymentCommand, InitiatePaymentResult,
    ReconcilePaymentResult,
};
use crate::domain::foundation::{MerchantTransactionId, OrderId, ValidationError};
use crate::domain::payment::{DeviceContext, PaymentIntent, PaymentTransaction, TransactionStatus};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to start a payment.
#[derive(Debug, Clone, Deserialize)]
pub struct InitiatePaymentRequest {
    pub order_id: String,
    pub merchant_transaction_id: String,
    /// Amount in the smallest currency unit.
    pub amount: i64,
    pub merchant_user_id: String,
    pub redirect_url: String,
    pub callback_url: String,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub device_os: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl InitiatePaymentRequest {
    /// Validates the request into an application command.
    pub fn into_command(self) -> Result<InitiatePaymentCommand, ValidationError> {
        let order_id = OrderId::new(self.order_id)?;
        let merchant_transaction_id = MerchantTransactionId::new(self.merchant_transaction_id)?;

        let mut intent = PaymentIntent::new(
            self.amount,
            merchant_transaction_id,
            self.merchant_user_id,
            self.redirect_url,
            self.callback_url,
        )?;
        if let Some(mobile_number) = self.mobile_number {
            intent = intent.with_mobile_number(mobile_number)?;
        }
        if let Some(device_os) = self.device_os {
            intent = intent.with_device_context(DeviceContext { device_os });
        }

        Ok(InitiatePaymentCommand {
            order_id,
            intent,
            metadata: self.metadata.unwrap_or_else(|| Value::Object(Default::default())),
        })
    }
}

/// Request to cancel a payment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelPaymentRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request to record a refund.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordRefundRequest {
    /// Gateway refund response, if any.
    #[serde(default)]
    pub provider_response: Option<Value>,
}

/// Gateway webhook body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookRequest {
    /// Base64-encoded notification.
    pub response: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// A stored payment record.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub order_id: String,
    pub merchant_transaction_id: String,
    pub amount: i64,
    pub status: TransactionStatus,
    pub provider_transaction_id: Option<String>,
    pub payment_method: Option<String>,
    pub provider_response_code: Option<String>,
    pub provider_response_message: Option<String>,
    pub metadata: Value,
    /// ISO 8601.
    pub created_at: String,
    /// ISO 8601.
    pub updated_at: String,
}

impl From<PaymentTransaction> for PaymentResponse {
    fn from(txn: PaymentTransaction) -> Self {
        Self {
            id: txn.id.to_string(),
            order_id: txn.order_id.to_string(),
            merchant_transaction_id: txn.merchant_transaction_id.to_string(),
            amount: txn.amount,
            status: txn.status,
            provider_transaction_id: txn.provider_transaction_id,
            payment_method: txn.payment_method,
            provider_response_code: txn.provider_response_code,
            provider_response_message: txn.provider_response_message,
            metadata: txn.metadata,
            created_at: txn.created_at.to_rfc3339(),
            updated_at: txn.updated_at.to_rfc3339(),
        }
    }
}

/// Response for an accepted initiation.
#[derive(Debug, Clone, Serialize)]
pub struct InitiatePaymentResponse {
    pub transaction_id: String,
    pub merchant_transaction_id: String,
    pub status: TransactionStatus,
    pub redirect_url: Option<String>,
    pub code: String,
}

impl From<InitiatePaymentResult> for InitiatePaymentResponse {
    fn from(result: InitiatePaymentResult) -> Self {
        Self {
            transaction_id: result.transaction_id.to_string(),
            merchant_transaction_id: result.merchant_transaction_id.to_string(),
            status: result.status,
            redirect_url: result.redirect_url,
            code: result.gateway.code,
        }
    }
}

/// Outcome of a reconciliation.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileOutcome {
    Updated,
    AlreadyFinal,
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcilePaymentResponse {
    pub outcome: ReconcileOutcome,
    pub payment: PaymentResponse,
}

impl From<ReconcilePaymentResult> for ReconcilePaymentResponse {
    fn from(result: ReconcilePaymentResult) -> Self {
        let (outcome, transaction) = match result {
            ReconcilePaymentResult::Updated { transaction } => (ReconcileOutcome::Updated, transaction),
            ReconcilePaymentResult::AlreadyFinal { transaction } => {
                (ReconcileOutcome::AlreadyFinal, transaction)
            }
            ReconcilePaymentResult::Unknown { transaction } => (ReconcileOutcome::Unknown, transaction),
        };
        Self {
            outcome,
            payment: transaction.into(),
        }
    }
}

/// Webhook acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookResponse {
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<HandlePaymentWebhookResult> for WebhookResponse {
    fn from(result: HandlePaymentWebhookResult) -> Self {
        match result {
            HandlePaymentWebhookResult::Applied { transaction } => Self {
                applied: true,
                merchant_transaction_id: Some(transaction.merchant_transaction_id.to_string()),
                status: Some(transaction.status),
                code: transaction.provider_response_code,
            },
            HandlePaymentWebhookResult::Ignored { code } => Self {
                applied: false,
                merchant_transaction_id: None,
                status: None,
                code,
            },
        }
    }
}

/// All payments made for an order, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPaymentsResponse {
    pub order_id: String,
    pub payments: Vec<PaymentResponse>,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
