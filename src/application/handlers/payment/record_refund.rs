//! RecordRefundHandler - Command handler for marking a settled payment refunded.

use serde_json::Value;
use std::sync::Arc;

use crate::application::TransactionRecorder;
use crate::domain::foundation::MerchantTransactionId;
use crate::domain::payment::{PaymentError, PaymentTransaction, StatusUpdate, TransactionStatus};

/// Command to record a refund.
#[derive(Debug, Clone)]
pub struct RecordRefundCommand {
    pub merchant_transaction_id: MerchantTransactionId,
    /// Gateway's refund response, when the refund went through the gateway.
    pub provider_response: Option<Value>,
}

/// Result of recording a refund.
#[derive(Debug, Clone)]
pub struct RecordRefundResult {
    pub transaction: PaymentTransaction,
}

/// Handler for recording refunds. Only `SUCCESS` payments can be refunded.
pub struct RecordRefundHandler {
    recorder: Arc<TransactionRecorder>,
}

impl RecordRefundHandler {
    pub fn new(recorder: Arc<TransactionRecorder>) -> Self {
        Self { recorder }
    }

    pub async fn handle(&self, cmd: RecordRefundCommand) -> Result<RecordRefundResult, PaymentError> {
        let update = match cmd.provider_response {
            Some(raw) => StatusUpdate::from_provider_response(TransactionStatus::Refunded, raw),
            None => StatusUpdate::local(TransactionStatus::Refunded, "Refund recorded"),
        };

        let transaction = self
            .recorder
            .apply(&cmd.merchant_transaction_id, update)
            .await?;

        Ok(RecordRefundResult { transaction })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::InMemoryTransactionStore;
    use crate::domain::foundation::{ErrorCode, OrderId};
    use serde_json::json;

    fn mtid() -> MerchantTransactionId {
        MerchantTransactionId::new("TX1").unwrap()
    }

    async fn setup(path: &[TransactionStatus]) -> RecordRefundHandler {
        let recorder = Arc::new(TransactionRecorder::new(Arc::new(InMemoryTransactionStore::new())));
        recorder
            .create(&OrderId::new("ORD-1").unwrap(), &mtid(), 500, json!({}))
            .await
            .unwrap();
        for status in path {
            recorder.apply(&mtid(), StatusUpdate::local(*status, "setup")).await.unwrap();
        }
        RecordRefundHandler::new(recorder)
    }

    #[tokio::test]
    async fn successful_payment_is_refunded() {
        let handler = setup(&[TransactionStatus::Pending, TransactionStatus::Success]).await;

        let result = handler
            .handle(RecordRefundCommand {
                merchant_transaction_id: mtid(),
                provider_response: Some(json!({
                    "success": true,
                    "code": "PAYMENT_SUCCESS",
                    "message": "Refund processed",
                    "data": {
                        "merchantTransactionId": "RF1",
                        "transactionId": "RT1",
                        "state": "COMPLETED"
                    }
                })),
            })
            .await
            .unwrap();

        assert_eq!(result.transaction.status, TransactionStatus::Refunded);
        assert_eq!(result.transaction.provider_transaction_id.as_deref(), Some("RT1"));
    }

    #[tokio::test]
    async fn failed_payment_cannot_be_refunded() {
        let handler = setup(&[TransactionStatus::Pending, TransactionStatus::Failed]).await;

        let err = handler
            .handle(RecordRefundCommand {
                merchant_transaction_id: mtid(),
                provider_response: None,
            })
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PaymentError::invalid_transition(TransactionStatus::Failed, TransactionStatus::Refunded)
        );
    }

    #[tokio::test]
    async fn uncaptured_payment_cannot_be_refunded() {
        for (path, from) in [
            (vec![], TransactionStatus::Initiated),
            (vec![TransactionStatus::Pending], TransactionStatus::Pending),
        ] {
            let handler = setup(&path).await;

            let err = handler
                .handle(RecordRefundCommand {
                    merchant_transaction_id: mtid(),
                    provider_response: None,
                })
                .await
                .unwrap_err();

            assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
            assert_eq!(
                err,
                PaymentError::invalid_transition(from, TransactionStatus::Refunded)
            );

            let stored = handler
                .recorder
                .get_by_merchant_transaction_id(&mtid())
                .await
                .unwrap();
            assert_eq!(stored.status, from);
        }
    }
}
