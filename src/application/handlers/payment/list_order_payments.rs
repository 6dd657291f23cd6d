//! ListOrderPaymentsHandler - Query handler for every attempt made for an order.

use std::sync::Arc;

use crate::application::TransactionRecorder;
use crate::domain::foundation::OrderId;
use crate::domain::payment::PaymentTransaction;

#[derive(Debug, Clone)]
pub struct ListOrderPaymentsQuery {
    pub order_id: OrderId,
}

/// Payments for an order, newest first.
#[derive(Debug, Clone)]
pub struct ListOrderPaymentsResult {
    pub order_id: OrderId,
    pub payments: Vec<PaymentTransaction>,
}

pub struct ListOrderPaymentsHandler {
    recorder: Arc<TransactionRecorder>,
}

impl ListOrderPaymentsHandler {
    pub fn new(recorder: Arc<TransactionRecorder>) -> Self {
        Self { recorder }
    }

    pub async fn handle(&self, query: ListOrderPaymentsQuery) -> ListOrderPaymentsResult {
        let payments = self.recorder.list_by_order(&query.order_id).await;
        ListOrderPaymentsResult {
            order_id: query.order_id,
            payments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::InMemoryTransactionStore;
    use crate::domain::foundation::MerchantTransactionId;
    use serde_json::json;

    #[tokio::test]
    async fn lists_only_the_requested_order() {
        let recorder = Arc::new(TransactionRecorder::new(Arc::new(InMemoryTransactionStore::new())));
        for (order, id) in [("ORD-1", "TX1"), ("ORD-2", "TX2"), ("ORD-1", "TX3")] {
            recorder
                .create(
                    &OrderId::new(order).unwrap(),
                    &MerchantTransactionId::new(id).unwrap(),
                    100,
                    json!({}),
                )
                .await
                .unwrap();
        }
        let handler = ListOrderPaymentsHandler::new(recorder);

        let result = handler
            .handle(ListOrderPaymentsQuery {
                order_id: OrderId::new("ORD-1").unwrap(),
            })
            .await;

        let ids: Vec<&str> = result
            .payments
            .iter()
            .map(|p| p.merchant_transaction_id.as_str())
            .collect();
        assert_eq!(ids, vec!["TX3", "TX1"]);
    }
}
