//! Gateway client - signed initiation and status calls with retry.
//!
//! # Configuration
//!
//! ```ignore
//! let credentials = MerchantCredentials::new("MERCHANT1", secret, "1");
//! let client = GatewayClient::new(Some(credentials), SANDBOX_BASE_URL, transport)
//!     .with_request_timeout(Duration::from_secs(30));
//!
//! let result = client.initiate_payment(&intent, DEFAULT_INITIATE_RETRIES).await;
//! ```
//!
//! # Retry behavior
//!
//! Initiation creates provider-side state, so it stops at the first permanent
//! provider error and otherwise backs off exponentially. Status checks are
//! idempotent reads and retry every failure with linear backoff.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use super::retry::{Backoff, RetryFailure, RetryPolicy};
use crate::config::GatewayConfig;
use crate::domain::foundation::{ErrorCode, MerchantTransactionId};
use crate::domain::payment::{
    build_initiation_payload, GatewayResult, MerchantCredentials, PaymentIntent, ProviderResponse,
    SignedRequest,
};
use crate::ports::{
    HttpTransport, PaymentGateway, TransportError, TransportRequest, TransportResponse,
    DEFAULT_INITIATE_RETRIES, DEFAULT_STATUS_RETRIES,
};

/// Endpoint for payment initiation.
pub const PAY_ENDPOINT: &str = "/pg/v1/pay";

/// Default per-attempt deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a single attempt did not produce a usable result.
#[derive(Debug, Clone)]
enum AttemptError {
    Transport(TransportError),
    Provider(GatewayResult),
}

impl AttemptError {
    fn message(&self) -> String {
        match self {
            AttemptError::Transport(err) => err.to_string(),
            AttemptError::Provider(result) => result.message.clone(),
        }
    }

    fn code(&self) -> Option<&str> {
        match self {
            AttemptError::Transport(_) => None,
            AttemptError::Provider(result) => Some(result.code.as_str()),
        }
    }
}

fn initiation_retryable(error: &AttemptError) -> bool {
    match error {
        AttemptError::Transport(_) => true,
        AttemptError::Provider(result) => !result.is_permanent_failure(),
    }
}

fn always_retryable(_: &AttemptError) -> bool {
    true
}

/// Client for the gateway's `/pg/v1` API.
pub struct GatewayClient {
    credentials: Option<MerchantCredentials>,
    base_url: String,
    request_timeout: Duration,
    transport: Arc<dyn HttpTransport>,
    initiation_policy: RetryPolicy<AttemptError>,
    status_policy: RetryPolicy<AttemptError>,
}

impl GatewayClient {
    /// Creates a client; `None` credentials disable every gateway call.
    pub fn new(
        credentials: Option<MerchantCredentials>,
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            credentials,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            transport,
            initiation_policy: RetryPolicy::new(
                DEFAULT_INITIATE_RETRIES,
                Backoff::exponential(),
                initiation_retryable,
            ),
            status_policy: RetryPolicy::new(
                DEFAULT_STATUS_RETRIES,
                Backoff::linear(),
                always_retryable,
            ),
        }
    }

    /// Builds a client from configuration.
    pub fn from_config(config: &GatewayConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(config.credentials(), config.base_url(), transport)
            .with_request_timeout(config.request_timeout())
    }

    /// Sets the per-attempt deadline.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Sends one attempt and decodes whatever comes back.
    ///
    /// Non-2xx responses that still carry a gateway envelope are decoded like
    /// any other response so their codes can be classified.
    async fn send(&self, request: TransportRequest) -> Result<GatewayResult, TransportError> {
        let response = match timeout(self.request_timeout, self.transport.execute(request)).await {
            Ok(result) => result?,
            Err(_) => return Err(TransportError::Timeout(self.request_timeout)),
        };

        Self::decode(response)
    }

    fn decode(response: TransportResponse) -> Result<GatewayResult, TransportError> {
        let raw: Value = serde_json::from_str(&response.body)
            .unwrap_or_else(|_| Value::String(response.body.clone()));
        let decoded = ProviderResponse::decode(&raw);

        if !response.is_success() && matches!(decoded, ProviderResponse::Unrecognized { .. }) {
            return Err(TransportError::Status {
                status: response.status,
                body: response.body,
            });
        }

        Ok(GatewayResult::from_response(decoded, raw))
    }

    fn signed_headers(request: TransportRequest, signed: &SignedRequest, merchant_id: &str) -> TransportRequest {
        request
            .with_header("Content-Type", "application/json")
            .with_header("X-VERIFY", signed.checksum.clone())
            .with_header("X-MERCHANT-ID", merchant_id)
    }

    async fn attempt_initiation(
        &self,
        request: TransportRequest,
        merchant_transaction_id: &MerchantTransactionId,
        attempt: u32,
    ) -> Result<GatewayResult, AttemptError> {
        let outcome = match self.send(request).await {
            Ok(result) if result.success => Ok(result),
            Ok(result) => Err(AttemptError::Provider(result)),
            Err(err) => Err(AttemptError::Transport(err)),
        };

        if let Err(err) = &outcome {
            tracing::warn!(
                merchant_transaction_id = %merchant_transaction_id,
                attempt,
                code = err.code().unwrap_or("TRANSPORT"),
                error = %err.message(),
                "Payment initiation attempt failed"
            );
        }

        outcome
    }

    async fn attempt_status(
        &self,
        request: TransportRequest,
        merchant_transaction_id: &MerchantTransactionId,
        attempt: u32,
    ) -> Result<GatewayResult, AttemptError> {
        let outcome = match self.send(request).await {
            Ok(result) if result.success => Ok(result),
            Ok(result) => Err(AttemptError::Provider(result)),
            Err(err) => Err(AttemptError::Transport(err)),
        };

        if let Err(err) = &outcome {
            tracing::warn!(
                merchant_transaction_id = %merchant_transaction_id,
                attempt,
                code = err.code().unwrap_or("TRANSPORT"),
                error = %err.message(),
                "Payment status check attempt failed"
            );
        }

        outcome
    }
}

#[async_trait]
impl PaymentGateway for GatewayClient {
    async fn initiate_payment(&self, intent: &PaymentIntent, max_retries: u32) -> GatewayResult {
        let merchant_transaction_id = intent.merchant_transaction_id();

        let Some(credentials) = &self.credentials else {
            tracing::error!(
                merchant_transaction_id = %merchant_transaction_id,
                "Payment gateway credentials missing; initiation skipped"
            );
            return GatewayResult::local_failure(
                ErrorCode::ConfigError,
                "Payment gateway credentials are not configured",
            );
        };

        let payload = match build_initiation_payload(intent, credentials.merchant_id()).encode() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(
                    merchant_transaction_id = %merchant_transaction_id,
                    error = %err,
                    "Failed to encode initiation payload"
                );
                return GatewayResult::local_failure(ErrorCode::InternalError, err.to_string());
            }
        };

        let signed = credentials
            .signer()
            .sign_request(payload.into_string(), PAY_ENDPOINT);
        let request = Self::signed_headers(
            TransportRequest::post(
                format!("{}{}", self.base_url, PAY_ENDPOINT),
                json!({ "request": signed.payload }),
            ),
            &signed,
            credentials.merchant_id(),
        );

        let outcome = self
            .initiation_policy
            .with_max_retries(max_retries)
            .run(|attempt| {
                let request = request.clone();
                async move {
                    self.attempt_initiation(request, merchant_transaction_id, attempt)
                        .await
                }
            })
            .await;

        match outcome {
            Ok(result) => {
                tracing::info!(
                    merchant_transaction_id = %merchant_transaction_id,
                    code = %result.code,
                    "Payment initiated"
                );
                result
            }
            Err(RetryFailure::Permanent {
                error: AttemptError::Provider(result),
                ..
            }) => {
                tracing::warn!(
                    merchant_transaction_id = %merchant_transaction_id,
                    code = %result.code,
                    "Payment initiation rejected permanently"
                );
                result
            }
            Err(failure) => {
                let attempts = failure.attempts();
                let last = failure.into_error();
                tracing::error!(
                    merchant_transaction_id = %merchant_transaction_id,
                    attempts,
                    error = %last.message(),
                    "Payment initiation failed after retries"
                );
                GatewayResult::local_failure(ErrorCode::PaymentInitiationFailed, last.message())
            }
        }
    }

    async fn check_status(
        &self,
        merchant_transaction_id: &MerchantTransactionId,
        max_retries: u32,
    ) -> Option<GatewayResult> {
        let Some(credentials) = &self.credentials else {
            tracing::error!(
                merchant_transaction_id = %merchant_transaction_id,
                "Payment gateway credentials missing; status check skipped"
            );
            return None;
        };

        let endpoint = format!(
            "/pg/v1/status/{}/{}",
            credentials.merchant_id(),
            merchant_transaction_id
        );
        let signed = credentials.signer().sign_request("", endpoint.clone());
        let request = Self::signed_headers(
            TransportRequest::get(format!("{}{}", self.base_url, endpoint)),
            &signed,
            credentials.merchant_id(),
        );

        let outcome = self
            .status_policy
            .with_max_retries(max_retries)
            .run(|attempt| {
                let request = request.clone();
                async move {
                    self.attempt_status(request, merchant_transaction_id, attempt)
                        .await
                }
            })
            .await;

        match outcome {
            Ok(result) => Some(result),
            Err(failure) => {
                let attempts = failure.attempts();
                let last = failure.into_error();
                tracing::error!(
                    merchant_transaction_id = %merchant_transaction_id,
                    attempts,
                    error = %last.message(),
                    "Payment status unknown after retries"
                );
                None
            }
        }
    }
}
