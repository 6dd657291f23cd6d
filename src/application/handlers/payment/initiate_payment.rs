//! InitiatePaymentHandler - Command handler for starting a hosted-checkout payment.

use serde_json::Value;
use std::sync::Arc;

use crate::application::TransactionRecorder;
use crate::domain::foundation::{ErrorCode, MerchantTransactionId, OrderId, TransactionId, ValidationError};
use crate::domain::payment::{
    GatewayResult, KnownErrorCode, PaymentError, PaymentIntent, TransactionStatus,
};
use crate::ports::{PaymentGateway, DEFAULT_INITIATE_RETRIES};

/// Command to initiate a payment for an order.
#[derive(Debug, Clone)]
pub struct InitiatePaymentCommand {
    pub order_id: OrderId,
    pub intent: PaymentIntent,
    /// Caller-supplied data stored with the record.
    pub metadata: Value,
}

/// Result of a successful initiation.
#[derive(Debug, Clone)]
pub struct InitiatePaymentResult {
    pub transaction_id: TransactionId,
    pub merchant_transaction_id: MerchantTransactionId,
    pub status: TransactionStatus,
    /// Hosted payment page, exactly as the gateway returned it.
    pub redirect_url: Option<String>,
    pub gateway: GatewayResult,
}

/// Handler for payment initiation.
///
/// Records the transaction as `INITIATED` before the first gateway call, then
/// moves it according to the gateway's answer:
///
/// | Gateway outcome                 | Stored status | Returned                  |
/// |---------------------------------|---------------|---------------------------|
/// | success                         | `PENDING`     | `Ok`                      |
/// | `CONFIG_ERROR`                  | `FAILED`      | `Err(Configuration)`      |
/// | `BAD_REQUEST`/`INVALID_MERCHANT`| `FAILED`      | `Err(PermanentGateway)`   |
/// | `DUPLICATE_TRANSACTION`         | `INITIATED`   | `Err(PermanentGateway)`   |
/// | retries exhausted               | `INITIATED`   | `Err(TransientGateway)`   |
///
/// Records left `INITIATED` may exist at the provider and are settled by
/// reconciliation.
pub struct InitiatePaymentHandler {
    gateway: Arc<dyn PaymentGateway>,
    recorder: Arc<TransactionRecorder>,
    max_retries: u32,
}

impl InitiatePaymentHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>, recorder: Arc<TransactionRecorder>) -> Self {
        Self {
            gateway,
            recorder,
            max_retries: DEFAULT_INITIATE_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub async fn handle(
        &self,
        cmd: InitiatePaymentCommand,
    ) -> Result<InitiatePaymentResult, PaymentError> {
        let merchant_transaction_id = cmd.intent.merchant_transaction_id().clone();

        // 1. Merchant transaction ids are single-use
        if self
            .recorder
            .get_by_merchant_transaction_id(&merchant_transaction_id)
            .await
            .is_some()
        {
            return Err(ValidationError::invalid_format(
                "merchant_transaction_id",
                format!("'{}' has already been used", merchant_transaction_id),
            )
            .into());
        }

        // 2. Record before calling out
        let transaction_id = self
            .recorder
            .create(
                &cmd.order_id,
                &merchant_transaction_id,
                cmd.intent.amount(),
                cmd.metadata,
            )
            .await
            .ok_or_else(|| PaymentError::store("Failed to record payment transaction"))?;

        // 3. Call the gateway
        let result = self
            .gateway
            .initiate_payment(&cmd.intent, self.max_retries)
            .await;

        // 4. Move the record according to the outcome
        if result.success {
            self.recorder
                .update_status(&merchant_transaction_id, TransactionStatus::Pending, result.raw.clone())
                .await;

            return Ok(InitiatePaymentResult {
                transaction_id,
                merchant_transaction_id,
                status: TransactionStatus::Pending,
                redirect_url: result.redirect_url().map(str::to_string),
                gateway: result,
            });
        }

        let error = Self::classify_failure(&result);
        if Self::is_definitely_failed(&result) {
            self.recorder
                .update_status(&merchant_transaction_id, TransactionStatus::Failed, result.raw.clone())
                .await;
        } else {
            tracing::warn!(
                merchant_transaction_id = %merchant_transaction_id,
                code = %result.code,
                "Payment left INITIATED pending reconciliation"
            );
        }

        Err(error)
    }

    /// True when the provider cannot be holding a payment for this attempt.
    fn is_definitely_failed(result: &GatewayResult) -> bool {
        if result.code == ErrorCode::ConfigError.to_string()
            || result.code == ErrorCode::InternalError.to_string()
        {
            return true;
        }

        matches!(
            KnownErrorCode::parse(&result.code),
            Some(KnownErrorCode::BadRequest) | Some(KnownErrorCode::InvalidMerchant)
        )
    }

    fn classify_failure(result: &GatewayResult) -> PaymentError {
        if result.code == ErrorCode::ConfigError.to_string() {
            PaymentError::configuration(result.message.clone())
        } else if result.code == ErrorCode::InternalError.to_string() {
            PaymentError::Internal(result.message.clone())
        } else if result.is_permanent_failure() {
            PaymentError::PermanentGateway {
                code: result.code.clone(),
                message: result.message.clone(),
            }
        } else {
            PaymentError::TransientGateway {
                code: result.code.clone(),
                message: result.message.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::InMemoryTransactionStore;
    use crate::domain::payment::ProviderResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockGateway {
        result: GatewayResult,
        calls: Mutex<Vec<(String, u32)>>,
    }

    impl MockGateway {
        fn returning(result: GatewayResult) -> Self {
            Self {
                result,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn responding(raw: Value) -> Self {
            Self::returning(GatewayResult::from_response(ProviderResponse::decode(&raw), raw))
        }

        fn calls(&self) -> Vec<(String, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn initiate_payment(&self, intent: &PaymentIntent, max_retries: u32) -> GatewayResult {
            self.calls
                .lock()
                .unwrap()
                .push((intent.merchant_transaction_id().to_string(), max_retries));
            self.result.clone()
        }

        async fn check_status(&self, _: &MerchantTransactionId, _: u32) -> Option<GatewayResult> {
            None
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn intent(id: &str) -> PaymentIntent {
        PaymentIntent::new(
            10000,
            MerchantTransactionId::new(id).unwrap(),
            "U1",
            "https://x/r",
            "https://x/cb",
        )
        .unwrap()
    }

    fn command(id: &str) -> InitiatePaymentCommand {
        InitiatePaymentCommand {
            order_id: OrderId::new("ORD-1").unwrap(),
            intent: intent(id),
            metadata: json!({ "cart": 3 }),
        }
    }

    fn setup(gateway: MockGateway) -> (InitiatePaymentHandler, Arc<MockGateway>, Arc<TransactionRecorder>) {
        let gateway = Arc::new(gateway);
        let recorder = Arc::new(TransactionRecorder::new(Arc::new(InMemoryTransactionStore::new())));
        let handler = InitiatePaymentHandler::new(gateway.clone(), recorder.clone());
        (handler, gateway, recorder)
    }

    fn redirect_response() -> Value {
        json!({
            "success": true,
            "code": "PAYMENT_INITIATED",
            "message": "Payment initiated",
            "data": {
                "merchantId": "M1",
                "merchantTransactionId": "TX1",
                "instrumentResponse": {
                    "type": "PAY_PAGE",
                    "redirectInfo": { "url": "https://pay.test/p?a=1&b=%20", "method": "GET" }
                }
            }
        })
    }

    async fn stored_status(recorder: &TransactionRecorder, id: &str) -> TransactionStatus {
        recorder
            .get_by_merchant_transaction_id(&MerchantTransactionId::new(id).unwrap())
            .await
            .unwrap()
            .status
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn success_moves_record_to_pending_and_returns_redirect() {
        let (handler, gateway, recorder) = setup(MockGateway::responding(redirect_response()));

        let result = handler.handle(command("TX1")).await.unwrap();

        assert_eq!(result.status, TransactionStatus::Pending);
        assert_eq!(result.redirect_url.as_deref(), Some("https://pay.test/p?a=1&b=%20"));
        assert_eq!(stored_status(&recorder, "TX1").await, TransactionStatus::Pending);
        assert_eq!(gateway.calls(), vec![("TX1".to_string(), DEFAULT_INITIATE_RETRIES)]);
    }

    #[tokio::test]
    async fn metadata_is_stored_with_record() {
        let (handler, _, recorder) = setup(MockGateway::responding(redirect_response()));

        handler.handle(command("TX1")).await.unwrap();

        let record = recorder
            .get_by_merchant_transaction_id(&MerchantTransactionId::new("TX1").unwrap())
            .await
            .unwrap();
        assert_eq!(record.metadata["cart"], 3);
        assert_eq!(record.amount, 10000);
    }

    #[tokio::test]
    async fn retry_budget_is_passed_to_gateway() {
        let (handler, gateway, _) = setup(MockGateway::responding(redirect_response()));
        let handler = handler.with_max_retries(5);

        handler.handle(command("TX1")).await.unwrap();

        assert_eq!(gateway.calls()[0].1, 5);
    }

    #[tokio::test]
    async fn config_error_marks_record_failed() {
        let (handler, _, recorder) = setup(MockGateway::returning(GatewayResult::local_failure(
            ErrorCode::ConfigError,
            "not configured",
        )));

        let err = handler.handle(command("TX1")).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::ConfigError);
        assert_eq!(stored_status(&recorder, "TX1").await, TransactionStatus::Failed);
    }

    #[tokio::test]
    async fn bad_request_is_permanent_and_marks_record_failed() {
        let (handler, _, recorder) = setup(MockGateway::responding(json!({
            "success": false, "code": "BAD_REQUEST", "message": "amount invalid"
        })));

        let err = handler.handle(command("TX1")).await.unwrap_err();

        assert_eq!(
            err,
            PaymentError::PermanentGateway {
                code: "BAD_REQUEST".into(),
                message: "amount invalid".into()
            }
        );
        assert_eq!(stored_status(&recorder, "TX1").await, TransactionStatus::Failed);
    }

    #[tokio::test]
    async fn duplicate_transaction_leaves_record_initiated() {
        let (handler, _, recorder) = setup(MockGateway::responding(json!({
            "success": false, "code": "DUPLICATE_TRANSACTION", "message": "seen before"
        })));

        let err = handler.handle(command("TX1")).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::PermanentGatewayError);
        assert_eq!(stored_status(&recorder, "TX1").await, TransactionStatus::Initiated);
    }

    #[tokio::test]
    async fn exhausted_retries_leave_record_initiated() {
        let (handler, _, recorder) = setup(MockGateway::returning(GatewayResult::local_failure(
            ErrorCode::PaymentInitiationFailed,
            "connection reset",
        )));

        let err = handler.handle(command("TX1")).await.unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(stored_status(&recorder, "TX1").await, TransactionStatus::Initiated);
    }

    #[tokio::test]
    async fn reused_merchant_transaction_id_is_rejected_without_gateway_call() {
        let (handler, gateway, _) = setup(MockGateway::responding(redirect_response()));
        handler.handle(command("TX1")).await.unwrap();

        let err = handler.handle(command("TX1")).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert_eq!(gateway.calls().len(), 1);
    }
}
