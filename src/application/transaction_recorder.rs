//! TransactionRecorder - validated reads and writes of payment records.
//!
//! Sits between handlers and the `TransactionStore` port. It extracts provider
//! fields from raw responses, refuses status changes the state machine does
//! not allow, and turns store failures into logged `Option`/`bool` results for
//! callers that only need to know whether the write happened.

use serde_json::Value;
use std::sync::Arc;

use crate::domain::foundation::{MerchantTransactionId, OrderId, TransactionId};
use crate::domain::payment::{PaymentError, PaymentTransaction, StatusUpdate, TransactionStatus};
use crate::ports::{NewTransaction, StoreError, TransactionStore};

/// Store adapter enforcing transaction invariants.
#[derive(Clone)]
pub struct TransactionRecorder {
    store: Arc<dyn TransactionStore>,
}

impl TransactionRecorder {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    /// Creates an `INITIATED` record; `None` if the store refused or failed.
    pub async fn create(
        &self,
        order_id: &OrderId,
        merchant_transaction_id: &MerchantTransactionId,
        amount: i64,
        metadata: Value,
    ) -> Option<TransactionId> {
        let new = NewTransaction {
            order_id: order_id.clone(),
            merchant_transaction_id: merchant_transaction_id.clone(),
            amount,
            metadata,
        };

        match self.store.create(new).await {
            Ok(id) => {
                tracing::info!(
                    merchant_transaction_id = %merchant_transaction_id,
                    order_id = %order_id,
                    transaction_id = %id,
                    "Payment transaction created"
                );
                Some(id)
            }
            Err(err) => {
                tracing::error!(
                    merchant_transaction_id = %merchant_transaction_id,
                    error = %err,
                    "Failed to create payment transaction"
                );
                None
            }
        }
    }

    /// Moves a record to `status`, mapping provider fields from `provider_response`.
    ///
    /// Returns false when the record is missing, the transition is not
    /// allowed, or the store failed. Every such case is logged.
    pub async fn update_status(
        &self,
        merchant_transaction_id: &MerchantTransactionId,
        status: TransactionStatus,
        provider_response: Value,
    ) -> bool {
        let update = StatusUpdate::from_provider_response(status, provider_response);
        self.apply(merchant_transaction_id, update).await.is_ok()
    }

    /// Applies an update and returns the stored record.
    ///
    /// # Errors
    ///
    /// - `NotFound` - no record for the id
    /// - `InvalidTransition` - target status is not reachable from the current one
    /// - `Store` - the store failed
    pub async fn apply(
        &self,
        merchant_transaction_id: &MerchantTransactionId,
        update: StatusUpdate,
    ) -> Result<PaymentTransaction, PaymentError> {
        let current = self
            .load(merchant_transaction_id)
            .await?
            .ok_or_else(|| {
                tracing::error!(
                    merchant_transaction_id = %merchant_transaction_id,
                    "Status update for unknown payment transaction"
                );
                PaymentError::not_found(merchant_transaction_id.as_str())
            })?;

        if !current.status.accepts(&update.status) {
            let err = PaymentError::invalid_transition(current.status, update.status);
            tracing::error!(
                merchant_transaction_id = %merchant_transaction_id,
                code = %err.code(),
                from = %current.status,
                to = %update.status,
                "Rejected payment status change"
            );
            return Err(err);
        }

        self.store
            .update_status(merchant_transaction_id, current.status, &update)
            .await
            .map_err(|err| {
                tracing::error!(
                    merchant_transaction_id = %merchant_transaction_id,
                    error = %err,
                    "Failed to update payment transaction status"
                );
                match err {
                    StoreError::NotFound(id) => PaymentError::not_found(id),
                    StoreError::Rejected(_) => {
                        PaymentError::invalid_transition(current.status, update.status)
                    }
                    other => PaymentError::store(other.to_string()),
                }
            })?;

        if current.status != update.status {
            tracing::info!(
                merchant_transaction_id = %merchant_transaction_id,
                from = %current.status,
                to = %update.status,
                "Payment status changed"
            );
        }

        self.load(merchant_transaction_id)
            .await?
            .ok_or_else(|| PaymentError::not_found(merchant_transaction_id.as_str()))
    }

    /// Looks up a record; `None` if missing or the store failed.
    pub async fn get_by_merchant_transaction_id(
        &self,
        merchant_transaction_id: &MerchantTransactionId,
    ) -> Option<PaymentTransaction> {
        self.load(merchant_transaction_id).await.ok().flatten()
    }

    /// Records for an order, newest first; empty if the store failed.
    pub async fn list_by_order(&self, order_id: &OrderId) -> Vec<PaymentTransaction> {
        match self.store.list_by_order(order_id).await {
            Ok(records) => records,
            Err(err) => {
                tracing::error!(
                    order_id = %order_id,
                    error = %err,
                    "Failed to list payment transactions"
                );
                Vec::new()
            }
        }
    }

    async fn load(
        &self,
        merchant_transaction_id: &MerchantTransactionId,
    ) -> Result<Option<PaymentTransaction>, PaymentError> {
        self.store
            .find_by_merchant_transaction_id(merchant_transaction_id)
            .await
            .map_err(|err| {
                tracing::error!(
                    merchant_transaction_id = %merchant_transaction_id,
                    error = %err,
                    "Failed to load payment transaction"
                );
                PaymentError::store(err.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::InMemoryTransactionStore;
    use async_trait::async_trait;
    use serde_json::json;

    fn recorder() -> (TransactionRecorder, InMemoryTransactionStore) {
        let store = InMemoryTransactionStore::new();
        (TransactionRecorder::new(Arc::new(store.clone())), store)
    }

    fn mtid(id: &str) -> MerchantTransactionId {
        MerchantTransactionId::new(id).unwrap()
    }

    fn order() -> OrderId {
        OrderId::new("ORD-1").unwrap()
    }

    fn success_response() -> Value {
        json!({
            "success": true,
            "code": "PAYMENT_SUCCESS",
            "message": "paid",
            "data": {
                "merchantTransactionId": "TX1",
                "transactionId": "T1",
                "state": "COMPLETED",
                "responseCode": "SUCCESS",
                "paymentInstrument": { "type": "NETBANKING" }
            }
        })
    }

    struct FailingStore;

    #[async_trait]
    impl TransactionStore for FailingStore {
        async fn create(&self, _: NewTransaction) -> Result<TransactionId, StoreError> {
            Err(StoreError::Database("connection refused".into()))
        }

        async fn update_status(
            &self,
            _: &MerchantTransactionId,
            _: TransactionStatus,
            _: &StatusUpdate,
        ) -> Result<(), StoreError> {
            Err(StoreError::Database("connection refused".into()))
        }

        async fn find_by_merchant_transaction_id(
            &self,
            _: &MerchantTransactionId,
        ) -> Result<Option<PaymentTransaction>, StoreError> {
            Err(StoreError::Database("connection refused".into()))
        }

        async fn list_by_order(&self, _: &OrderId) -> Result<Vec<PaymentTransaction>, StoreError> {
            Err(StoreError::Database("connection refused".into()))
        }
    }

    /// Lets a capture land between the recorder's read and its write.
    struct CapturedMidwayStore {
        inner: InMemoryTransactionStore,
    }

    #[async_trait]
    impl TransactionStore for CapturedMidwayStore {
        async fn create(&self, transaction: NewTransaction) -> Result<TransactionId, StoreError> {
            self.inner.create(transaction).await
        }

        async fn update_status(
            &self,
            merchant_transaction_id: &MerchantTransactionId,
            expected: TransactionStatus,
            update: &StatusUpdate,
        ) -> Result<(), StoreError> {
            self.inner
                .update_status(
                    merchant_transaction_id,
                    TransactionStatus::Pending,
                    &StatusUpdate::local(TransactionStatus::Success, "captured"),
                )
                .await?;
            self.inner
                .update_status(merchant_transaction_id, expected, update)
                .await
        }

        async fn find_by_merchant_transaction_id(
            &self,
            merchant_transaction_id: &MerchantTransactionId,
        ) -> Result<Option<PaymentTransaction>, StoreError> {
            self.inner
                .find_by_merchant_transaction_id(merchant_transaction_id)
                .await
        }

        async fn list_by_order(&self, order_id: &OrderId) -> Result<Vec<PaymentTransaction>, StoreError> {
            self.inner.list_by_order(order_id).await
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // create / read
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn create_returns_id_and_record_is_readable() {
        let (recorder, _) = recorder();

        let id = recorder.create(&order(), &mtid("TX1"), 10000, json!({})).await;
        let record = recorder.get_by_merchant_transaction_id(&mtid("TX1")).await;

        assert_eq!(record.map(|r| r.id), id);
    }

    #[tokio::test]
    async fn create_duplicate_returns_none() {
        let (recorder, _) = recorder();
        recorder.create(&order(), &mtid("TX1"), 10000, json!({})).await;

        assert!(recorder.create(&order(), &mtid("TX1"), 10000, json!({})).await.is_none());
    }

    #[tokio::test]
    async fn store_failures_become_absent_results() {
        let recorder = TransactionRecorder::new(Arc::new(FailingStore));

        assert!(recorder.create(&order(), &mtid("TX1"), 1, json!({})).await.is_none());
        assert!(recorder.get_by_merchant_transaction_id(&mtid("TX1")).await.is_none());
        assert!(recorder.list_by_order(&order()).await.is_empty());
        assert!(
            !recorder
                .update_status(&mtid("TX1"), TransactionStatus::Pending, json!({}))
                .await
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // update_status / apply
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn update_status_extracts_provider_fields() {
        let (recorder, _) = recorder();
        recorder.create(&order(), &mtid("TX1"), 10000, json!({})).await;

        assert!(
            recorder
                .update_status(&mtid("TX1"), TransactionStatus::Success, success_response())
                .await
        );

        let record = recorder.get_by_merchant_transaction_id(&mtid("TX1")).await.unwrap();
        assert_eq!(record.status, TransactionStatus::Success);
        assert_eq!(record.provider_transaction_id.as_deref(), Some("T1"));
        assert_eq!(record.payment_method.as_deref(), Some("NETBANKING"));
        assert_eq!(record.provider_response_code.as_deref(), Some("SUCCESS"));
        assert_eq!(record.provider_response_message.as_deref(), Some("paid"));
    }

    #[tokio::test]
    async fn update_status_of_missing_record_is_false() {
        let (recorder, _) = recorder();
        assert!(
            !recorder
                .update_status(&mtid("GHOST"), TransactionStatus::Pending, json!({}))
                .await
        );
    }

    #[tokio::test]
    async fn apply_surfaces_invalid_transition() {
        let (recorder, _) = recorder();
        recorder.create(&order(), &mtid("TX1"), 10000, json!({})).await;
        recorder
            .apply(&mtid("TX1"), StatusUpdate::local(TransactionStatus::Cancelled, "x"))
            .await
            .unwrap();

        let err = recorder
            .apply(
                &mtid("TX1"),
                StatusUpdate::from_provider_response(TransactionStatus::Success, success_response()),
            )
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PaymentError::invalid_transition(TransactionStatus::Cancelled, TransactionStatus::Success)
        );
        let record = recorder.get_by_merchant_transaction_id(&mtid("TX1")).await.unwrap();
        assert_eq!(record.status, TransactionStatus::Cancelled);
    }

    #[tokio::test]
    async fn apply_refuses_change_when_status_moved_after_read() {
        let store = InMemoryTransactionStore::new();
        store
            .create(NewTransaction {
                order_id: order(),
                merchant_transaction_id: mtid("TX1"),
                amount: 10000,
                metadata: json!({}),
            })
            .await
            .unwrap();
        store
            .update_status(
                &mtid("TX1"),
                TransactionStatus::Initiated,
                &StatusUpdate::local(TransactionStatus::Pending, "sent"),
            )
            .await
            .unwrap();
        let recorder = TransactionRecorder::new(Arc::new(CapturedMidwayStore {
            inner: store.clone(),
        }));

        let err = recorder
            .apply(&mtid("TX1"), StatusUpdate::local(TransactionStatus::Cancelled, "user"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PaymentError::invalid_transition(TransactionStatus::Pending, TransactionStatus::Cancelled)
        );
        let record = store
            .find_by_merchant_transaction_id(&mtid("TX1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, TransactionStatus::Success);
    }

    #[tokio::test]
    async fn apply_accepts_refresh_of_same_status() {
        let (recorder, _) = recorder();
        recorder.create(&order(), &mtid("TX1"), 10000, json!({})).await;
        recorder
            .update_status(&mtid("TX1"), TransactionStatus::Pending, json!({}))
            .await;

        let record = recorder
            .apply(
                &mtid("TX1"),
                StatusUpdate::from_provider_response(TransactionStatus::Pending, success_response()),
            )
            .await
            .unwrap();

        assert_eq!(record.status, TransactionStatus::Pending);
        assert_eq!(record.provider_transaction_id.as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn list_by_order_is_newest_first() {
        let (recorder, _) = recorder();
        recorder.create(&order(), &mtid("TX1"), 1, json!({})).await;
        recorder.create(&order(), &mtid("TX2"), 2, json!({})).await;

        let listed = recorder.list_by_order(&order()).await;

        assert_eq!(listed[0].merchant_transaction_id.as_str(), "TX2");
        assert_eq!(listed[1].merchant_transaction_id.as_str(), "TX1");
    }
}
