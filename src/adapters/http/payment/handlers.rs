//! HTTP handlers for payment endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::{
    CancelPaymentCommand, CancelPaymentHandler, GetPaymentHandler, GetPaymentQuery,
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, InitiatePaymentHandler,
    ListOrderPaymentsHandler, ListOrderPaymentsQuery, ReconcilePaymentCommand,
    ReconcilePaymentHandler, RecordRefundCommand, RecordRefundHandler, TransactionRecorder,
};
use crate::domain::foundation::{MerchantTransactionId, OrderId, ValidationError};
use crate::domain::payment::{PaymentError, WebhookVerifier};
use crate::ports::{PaymentGateway, DEFAULT_INITIATE_RETRIES, DEFAULT_STATUS_RETRIES};

use super::dto::{
    CancelPaymentRequest, ErrorResponse, InitiatePaymentRequest, InitiatePaymentResponse,
    OrderPaymentsResponse, PaymentResponse, ReconcilePaymentResponse, RecordRefundRequest,
    WebhookRequest, WebhookResponse,
};

/// Header carrying the webhook checksum.
pub const CHECKSUM_HEADER: &str = "X-VERIFY";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
#[derive(Clone)]
pub struct PaymentAppState {
    pub gateway: Arc<dyn PaymentGateway>,
    pub recorder: Arc<TransactionRecorder>,
    pub verifier: Arc<WebhookVerifier>,
    pub initiate_max_retries: u32,
    pub status_max_retries: u32,
}

impl PaymentAppState {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        recorder: Arc<TransactionRecorder>,
        verifier: Arc<WebhookVerifier>,
    ) -> Self {
        Self {
            gateway,
            recorder,
            verifier,
            initiate_max_retries: DEFAULT_INITIATE_RETRIES,
            status_max_retries: DEFAULT_STATUS_RETRIES,
        }
    }

    pub fn with_retry_budgets(mut self, initiate: u32, status: u32) -> Self {
        self.initiate_max_retries = initiate;
        self.status_max_retries = status;
        self
    }

    /// Create handlers on demand from the shared state.
    pub fn initiate_handler(&self) -> InitiatePaymentHandler {
        InitiatePaymentHandler::new(self.gateway.clone(), self.recorder.clone())
            .with_max_retries(self.initiate_max_retries)
    }

    pub fn reconcile_handler(&self) -> ReconcilePaymentHandler {
        ReconcilePaymentHandler::new(self.gateway.clone(), self.recorder.clone())
            .with_max_retries(self.status_max_retries)
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(self.verifier.clone(), self.recorder.clone())
    }

    pub fn cancel_handler(&self) -> CancelPaymentHandler {
        CancelPaymentHandler::new(self.recorder.clone())
    }

    pub fn refund_handler(&self) -> RecordRefundHandler {
        RecordRefundHandler::new(self.recorder.clone())
    }

    pub fn get_payment_handler(&self) -> GetPaymentHandler {
        GetPaymentHandler::new(self.recorder.clone())
    }

    pub fn list_order_payments_handler(&self) -> ListOrderPaymentsHandler {
        ListOrderPaymentsHandler::new(self.recorder.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /payments - Start a payment
pub async fn initiate_payment(
    State(state): State<PaymentAppState>,
    Json(request): Json<InitiatePaymentRequest>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let cmd = request.into_command()?;
    let result = state.initiate_handler().handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(InitiatePaymentResponse::from(result))))
}

/// POST /payments/:merchant_transaction_id/reconcile - Settle against the gateway
pub async fn reconcile_payment(
    State(state): State<PaymentAppState>,
    Path(merchant_transaction_id): Path<String>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let cmd = ReconcilePaymentCommand {
        merchant_transaction_id: MerchantTransactionId::new(merchant_transaction_id)?,
    };
    let result = state.reconcile_handler().handle(cmd).await?;
    Ok(Json(ReconcilePaymentResponse::from(result)))
}

/// POST /payments/:merchant_transaction_id/cancel - Cancel an undecided payment
pub async fn cancel_payment(
    State(state): State<PaymentAppState>,
    Path(merchant_transaction_id): Path<String>,
    request: Option<Json<CancelPaymentRequest>>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let cmd = CancelPaymentCommand {
        merchant_transaction_id: MerchantTransactionId::new(merchant_transaction_id)?,
        reason: request.reason,
    };
    let result = state.cancel_handler().handle(cmd).await?;
    Ok(Json(PaymentResponse::from(result.transaction)))
}

/// POST /payments/:merchant_transaction_id/refund - Record a refund
pub async fn record_refund(
    State(state): State<PaymentAppState>,
    Path(merchant_transaction_id): Path<String>,
    request: Option<Json<RecordRefundRequest>>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let cmd = RecordRefundCommand {
        merchant_transaction_id: MerchantTransactionId::new(merchant_transaction_id)?,
        provider_response: request.provider_response,
    };
    let result = state.refund_handler().handle(cmd).await?;
    Ok(Json(PaymentResponse::from(result.transaction)))
}

/// POST /webhooks/gateway - Gateway server-to-server notification
pub async fn handle_gateway_webhook(
    State(state): State<PaymentAppState>,
    headers: HeaderMap,
    Json(request): Json<WebhookRequest>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let checksum = headers
        .get(CHECKSUM_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandlePaymentWebhookCommand {
        response: request.response,
        checksum,
    };
    let result = state.webhook_handler().handle(cmd).await?;
    Ok(Json(WebhookResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /payments/:merchant_transaction_id - Get one payment
pub async fn get_payment(
    State(state): State<PaymentAppState>,
    Path(merchant_transaction_id): Path<String>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let query = GetPaymentQuery {
        merchant_transaction_id: MerchantTransactionId::new(merchant_transaction_id)?,
    };
    let payment = state.get_payment_handler().handle(query).await?;
    Ok(Json(PaymentResponse::from(payment)))
}

/// GET /orders/:order_id/payments - List an order's payments
pub async fn list_order_payments(
    State(state): State<PaymentAppState>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let query = ListOrderPaymentsQuery {
        order_id: OrderId::new(order_id)?,
    };
    let result = state.list_order_payments_handler().handle(query).await;
    Ok(Json(OrderPaymentsResponse {
        order_id: result.order_id.to_string(),
        payments: result.payments.into_iter().map(PaymentResponse::from).collect(),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper for converting payment errors to HTTP responses.
#[derive(Debug)]
pub struct PaymentApiError(PaymentError);

impl From<PaymentError> for PaymentApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for PaymentApiError {
    fn from(err: ValidationError) -> Self {
        Self(PaymentError::Validation(err))
    }
}

impl PaymentApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            PaymentError::Validation(_) => StatusCode::BAD_REQUEST,
            PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
            PaymentError::VerificationFailure(_) => StatusCode::UNAUTHORIZED,
            PaymentError::InvalidTransition { .. } => StatusCode::CONFLICT,
            PaymentError::PermanentGateway { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PaymentError::TransientGateway { .. } => StatusCode::BAD_GATEWAY,
            PaymentError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            PaymentError::Store(_) | PaymentError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match &self.0 {
            PaymentError::PermanentGateway { code, message }
            | PaymentError::TransientGateway { code, message } => {
                ErrorResponse::new(code.clone(), message.clone())
            }
            other => ErrorResponse::new(other.code().to_string(), other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}
