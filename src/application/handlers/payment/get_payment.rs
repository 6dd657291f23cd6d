//! GetPaymentHandler - Query handler for a single payment record.

use std::sync::Arc;

use crate::application::TransactionRecorder;
use crate::domain::foundation::MerchantTransactionId;
use crate::domain::payment::{PaymentError, PaymentTransaction};

/// Query for one payment by merchant transaction id.
#[derive(Debug, Clone)]
pub struct GetPaymentQuery {
    pub merchant_transaction_id: MerchantTransactionId,
}

pub struct GetPaymentHandler {
    recorder: Arc<TransactionRecorder>,
}

impl GetPaymentHandler {
    pub fn new(recorder: Arc<TransactionRecorder>) -> Self {
        Self { recorder }
    }

    pub async fn handle(&self, query: GetPaymentQuery) -> Result<PaymentTransaction, PaymentError> {
        self.recorder
            .get_by_merchant_transaction_id(&query.merchant_transaction_id)
            .await
            .ok_or_else(|| PaymentError::not_found(query.merchant_transaction_id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::InMemoryTransactionStore;
    use crate::domain::foundation::OrderId;
    use serde_json::json;

    #[tokio::test]
    async fn returns_stored_record_or_not_found() {
        let recorder = Arc::new(TransactionRecorder::new(Arc::new(InMemoryTransactionStore::new())));
        let id = MerchantTransactionId::new("TX1").unwrap();
        recorder
            .create(&OrderId::new("ORD-1").unwrap(), &id, 100, json!({}))
            .await
            .unwrap();
        let handler = GetPaymentHandler::new(recorder);

        let found = handler
            .handle(GetPaymentQuery { merchant_transaction_id: id })
            .await
            .unwrap();
        let missing = handler
            .handle(GetPaymentQuery {
                merchant_transaction_id: MerchantTransactionId::new("TX2").unwrap(),
            })
            .await;

        assert_eq!(found.amount, 100);
        assert_eq!(missing, Err(PaymentError::not_found("TX2")));
    }
}
