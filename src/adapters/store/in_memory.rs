//! In-Memory Transaction Store Adapter
//!
//! Keeps payment transactions in memory.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{MerchantTransactionId, OrderId, TransactionId};
use crate::domain::payment::{PaymentError, PaymentTransaction, StatusUpdate, TransactionStatus};
use crate::ports::{NewTransaction, StoreError, TransactionStore};

#[derive(Debug, Default)]
struct Records {
    /// Insertion counter; breaks ties between equal creation timestamps.
    next_seq: u64,
    by_merchant_id: HashMap<MerchantTransactionId, (u64, PaymentTransaction)>,
}

/// In-memory storage for payment transactions
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionStore {
    records: Arc<RwLock<Records>>,
}

impl InMemoryTransactionStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored transactions
    pub async fn len(&self) -> usize {
        self.records.read().await.by_merchant_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.records.write().await.by_merchant_id.clear();
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn create(&self, transaction: NewTransaction) -> Result<TransactionId, StoreError> {
        let mut records = self.records.write().await;

        if records
            .by_merchant_id
            .contains_key(&transaction.merchant_transaction_id)
        {
            return Err(StoreError::Duplicate(
                transaction.merchant_transaction_id.to_string(),
            ));
        }

        let id = TransactionId::new();
        let record = PaymentTransaction::initiate(
            id,
            transaction.order_id,
            transaction.merchant_transaction_id.clone(),
            transaction.amount,
            transaction.metadata,
        );

        let seq = records.next_seq;
        records.next_seq += 1;
        records
            .by_merchant_id
            .insert(transaction.merchant_transaction_id, (seq, record));

        Ok(id)
    }

    async fn update_status(
        &self,
        merchant_transaction_id: &MerchantTransactionId,
        expected: TransactionStatus,
        update: &StatusUpdate,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write().await;

        let (_, record) = records
            .by_merchant_id
            .get_mut(merchant_transaction_id)
            .ok_or_else(|| StoreError::NotFound(merchant_transaction_id.to_string()))?;

        if record.status != expected {
            return Err(StoreError::Rejected(format!(
                "{} is {}, expected {}",
                merchant_transaction_id, record.status, expected
            )));
        }

        record.apply_update(update).map_err(|e| match e {
            PaymentError::InvalidTransition { .. } => StoreError::Rejected(e.to_string()),
            other => StoreError::Database(other.to_string()),
        })
    }

    async fn find_by_merchant_transaction_id(
        &self,
        merchant_transaction_id: &MerchantTransactionId,
    ) -> Result<Option<PaymentTransaction>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .by_merchant_id
            .get(merchant_transaction_id)
            .map(|(_, record)| record.clone()))
    }

    async fn list_by_order(&self, order_id: &OrderId) -> Result<Vec<PaymentTransaction>, StoreError> {
        let records = self.records.read().await;

        let mut matching: Vec<&(u64, PaymentTransaction)> = records
            .by_merchant_id
            .values()
            .filter(|(_, record)| &record.order_id == order_id)
            .collect();
        matching.sort_by(|(a_seq, a), (b_seq, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b_seq.cmp(a_seq))
        });

        Ok(matching.into_iter().map(|(_, record)| record.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_transaction(order: &str, merchant_id: &str) -> NewTransaction {
        NewTransaction {
            order_id: OrderId::new(order).unwrap(),
            merchant_transaction_id: MerchantTransactionId::new(merchant_id).unwrap(),
            amount: 5000,
            metadata: json!({ "source": "test" }),
        }
    }

    fn mtid(id: &str) -> MerchantTransactionId {
        MerchantTransactionId::new(id).unwrap()
    }

    #[tokio::test]
    async fn create_stores_initiated_record() {
        let store = InMemoryTransactionStore::new();

        let id = store.create(new_transaction("ORD-1", "TX1")).await.unwrap();
        let record = store
            .find_by_merchant_transaction_id(&mtid("TX1"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(record.id, id);
        assert_eq!(record.status, TransactionStatus::Initiated);
        assert_eq!(record.metadata["source"], "test");
    }

    #[tokio::test]
    async fn create_rejects_duplicate_merchant_transaction_id() {
        let store = InMemoryTransactionStore::new();
        store.create(new_transaction("ORD-1", "TX1")).await.unwrap();

        let result = store.create(new_transaction("ORD-2", "TX1")).await;

        assert_eq!(result, Err(StoreError::Duplicate("TX1".to_string())));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_status_of_missing_record_is_not_found() {
        let store = InMemoryTransactionStore::new();
        let update = StatusUpdate::local(TransactionStatus::Cancelled, "x");

        let result = store
            .update_status(&mtid("NOPE"), TransactionStatus::Initiated, &update)
            .await;

        assert_eq!(result, Err(StoreError::NotFound("NOPE".to_string())));
    }

    #[tokio::test]
    async fn update_status_rejects_illegal_transition() {
        let store = InMemoryTransactionStore::new();
        store.create(new_transaction("ORD-1", "TX1")).await.unwrap();
        store
            .update_status(
                &mtid("TX1"),
                TransactionStatus::Initiated,
                &StatusUpdate::local(TransactionStatus::Cancelled, "x"),
            )
            .await
            .unwrap();

        let result = store
            .update_status(
                &mtid("TX1"),
                TransactionStatus::Cancelled,
                &StatusUpdate::local(TransactionStatus::Pending, "y"),
            )
            .await;

        assert!(matches!(result, Err(StoreError::Rejected(_))));
    }

    #[tokio::test]
    async fn update_status_from_stale_read_is_rejected() {
        let store = InMemoryTransactionStore::new();
        store.create(new_transaction("ORD-1", "TX1")).await.unwrap();
        store
            .update_status(
                &mtid("TX1"),
                TransactionStatus::Initiated,
                &StatusUpdate::local(TransactionStatus::Pending, "sent"),
            )
            .await
            .unwrap();
        store
            .update_status(
                &mtid("TX1"),
                TransactionStatus::Pending,
                &StatusUpdate::local(TransactionStatus::Success, "paid"),
            )
            .await
            .unwrap();

        // A second writer that read PENDING before the capture landed.
        let result = store
            .update_status(
                &mtid("TX1"),
                TransactionStatus::Pending,
                &StatusUpdate::local(TransactionStatus::Cancelled, "late cancel"),
            )
            .await;

        assert!(matches!(result, Err(StoreError::Rejected(_))));
        let record = store
            .find_by_merchant_transaction_id(&mtid("TX1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, TransactionStatus::Success);
    }

    #[tokio::test]
    async fn list_by_order_returns_newest_first() {
        let store = InMemoryTransactionStore::new();
        store.create(new_transaction("ORD-1", "TX1")).await.unwrap();
        store.create(new_transaction("ORD-2", "TX2")).await.unwrap();
        store.create(new_transaction("ORD-1", "TX3")).await.unwrap();

        let listed = store.list_by_order(&OrderId::new("ORD-1").unwrap()).await.unwrap();

        let ids: Vec<&str> = listed
            .iter()
            .map(|t| t.merchant_transaction_id.as_str())
            .collect();
        assert_eq!(ids, vec!["TX3", "TX1"]);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = InMemoryTransactionStore::new();
        store.create(new_transaction("ORD-1", "TX1")).await.unwrap();

        store.clear().await;

        assert!(store.is_empty().await);
    }
}
