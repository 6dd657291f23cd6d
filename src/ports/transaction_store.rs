//! Transaction store port.
//!
//! Persistence for payment transaction records. Implementations must keep
//! `merchant_transaction_id` unique and serialize writes to one record so a
//! create followed by updates is never lost.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::foundation::{MerchantTransactionId, OrderId, TransactionId};
use crate::domain::payment::{PaymentTransaction, StatusUpdate, TransactionStatus};

/// Data for a new record; it is stored as `INITIATED`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub order_id: OrderId,
    pub merchant_transaction_id: MerchantTransactionId,
    pub amount: i64,
    pub metadata: Value,
}

/// Errors from store implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Transaction already exists: {0}")]
    Duplicate(String),

    #[error("Transaction not found: {0}")]
    NotFound(String),

    /// The store refused the status change.
    #[error("Rejected transition: {0}")]
    Rejected(String),

    #[error("Database error: {0}")]
    Database(String),

    /// A stored row could not be turned back into a record.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Port for persisting payment transactions.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Inserts a new `INITIATED` record and returns its id.
    async fn create(&self, transaction: NewTransaction) -> Result<TransactionId, StoreError>;

    /// Writes a status change and the provider fields that came with it.
    ///
    /// The write happens only while the stored status is still `expected`;
    /// otherwise it fails with `Rejected` and the record is left untouched.
    async fn update_status(
        &self,
        merchant_transaction_id: &MerchantTransactionId,
        expected: TransactionStatus,
        update: &StatusUpdate,
    ) -> Result<(), StoreError>;

    async fn find_by_merchant_transaction_id(
        &self,
        merchant_transaction_id: &MerchantTransactionId,
    ) -> Result<Option<PaymentTransaction>, StoreError>;

    /// All records for an order, newest first.
    async fn list_by_order(&self, order_id: &OrderId) -> Result<Vec<PaymentTransaction>, StoreError>;
}
