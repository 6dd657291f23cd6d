//! PostgreSQL implementation of TransactionStore.
//!
//! Writes go through the `create_payment_transaction` and
//! `update_payment_transaction_status` database functions so each write is a
//! single statement; reads select from `payment_transactions` directly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{MerchantTransactionId, OrderId, Timestamp, TransactionId};
use crate::domain::payment::{PaymentTransaction, StatusUpdate, TransactionStatus};
use crate::ports::{NewTransaction, StoreError, TransactionStore};

/// PostgreSQL implementation of the TransactionStore port.
pub struct PostgresTransactionStore {
    pool: PgPool,
}

impl PostgresTransactionStore {
    /// Creates a new PostgresTransactionStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment transaction.
#[derive(Debug, sqlx::FromRow)]
struct PaymentTransactionRow {
    id: Uuid,
    order_id: String,
    merchant_transaction_id: String,
    amount: i64,
    status: String,
    provider_transaction_id: Option<String>,
    payment_method: Option<String>,
    provider_response_code: Option<String>,
    provider_response_message: Option<String>,
    provider_response: Option<Value>,
    metadata: Option<Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentTransactionRow> for PaymentTransaction {
    type Error = StoreError;

    fn try_from(row: PaymentTransactionRow) -> Result<Self, Self::Error> {
        let status: TransactionStatus = row
            .status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("Invalid status value: {}", e)))?;
        let order_id = OrderId::new(row.order_id)
            .map_err(|e| StoreError::Corrupt(format!("Invalid order_id: {}", e)))?;
        let merchant_transaction_id = MerchantTransactionId::new(row.merchant_transaction_id)
            .map_err(|e| StoreError::Corrupt(format!("Invalid merchant_transaction_id: {}", e)))?;

        Ok(PaymentTransaction {
            id: TransactionId::from_uuid(row.id),
            order_id,
            merchant_transaction_id,
            amount: row.amount,
            status,
            provider_transaction_id: row.provider_transaction_id,
            payment_method: row.payment_method,
            provider_response_code: row.provider_response_code,
            provider_response_message: row.provider_response_message,
            provider_response: row.provider_response,
            metadata: row.metadata.unwrap_or(Value::Null),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, order_id, merchant_transaction_id, amount, status,
           provider_transaction_id, payment_method, provider_response_code,
           provider_response_message, provider_response, metadata, created_at, updated_at
    FROM payment_transactions
"#;

fn database_error(action: &str, e: sqlx::Error) -> StoreError {
    StoreError::Database(format!("Failed to {}: {}", action, e))
}

/// The row moved on between the caller's read and the locked write.
fn stale_status(
    merchant_transaction_id: &MerchantTransactionId,
    found: &str,
    expected: TransactionStatus,
) -> StoreError {
    StoreError::Rejected(format!(
        "{} is {}, expected {}",
        merchant_transaction_id, found, expected
    ))
}

#[async_trait]
impl TransactionStore for PostgresTransactionStore {
    async fn create(&self, transaction: NewTransaction) -> Result<TransactionId, StoreError> {
        let id: Uuid = sqlx::query_scalar("SELECT create_payment_transaction($1, $2, $3, $4)")
            .bind(transaction.order_id.as_str())
            .bind(transaction.merchant_transaction_id.as_str())
            .bind(transaction.amount)
            .bind(&transaction.metadata)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return StoreError::Duplicate(
                            transaction.merchant_transaction_id.to_string(),
                        );
                    }
                }
                database_error("create payment transaction", e)
            })?;

        Ok(TransactionId::from_uuid(id))
    }

    async fn update_status(
        &self,
        merchant_transaction_id: &MerchantTransactionId,
        expected: TransactionStatus,
        update: &StatusUpdate,
    ) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error("begin status update", e))?;

        let locked: Option<String> = sqlx::query_scalar(
            "SELECT status FROM payment_transactions WHERE merchant_transaction_id = $1 FOR UPDATE",
        )
        .bind(merchant_transaction_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| database_error("lock payment transaction", e))?;

        let locked = locked
            .ok_or_else(|| StoreError::NotFound(merchant_transaction_id.to_string()))?;
        if locked != expected.as_str() {
            return Err(stale_status(merchant_transaction_id, &locked, expected));
        }

        let updated: bool = sqlx::query_scalar(
            "SELECT update_payment_transaction_status($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(merchant_transaction_id.as_str())
        .bind(update.status.as_str())
        .bind(&update.fields.provider_transaction_id)
        .bind(&update.fields.payment_method)
        .bind(&update.fields.response_code)
        .bind(&update.fields.response_message)
        .bind(&update.raw)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| database_error("update payment transaction status", e))?;

        if !updated {
            return Err(StoreError::NotFound(merchant_transaction_id.to_string()));
        }

        tx.commit()
            .await
            .map_err(|e| database_error("commit status update", e))
    }

    async fn find_by_merchant_transaction_id(
        &self,
        merchant_transaction_id: &MerchantTransactionId,
    ) -> Result<Option<PaymentTransaction>, StoreError> {
        let query = format!("{} WHERE merchant_transaction_id = $1", SELECT_COLUMNS);
        let row: Option<PaymentTransactionRow> = sqlx::query_as(&query)
            .bind(merchant_transaction_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("find payment transaction", e))?;

        row.map(PaymentTransaction::try_from).transpose()
    }

    async fn list_by_order(&self, order_id: &OrderId) -> Result<Vec<PaymentTransaction>, StoreError> {
        let query = format!(
            "{} WHERE order_id = $1 ORDER BY created_at DESC",
            SELECT_COLUMNS
        );
        let rows: Vec<PaymentTransactionRow> = sqlx::query_as(&query)
            .bind(order_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("list payment transactions", e))?;

        rows.into_iter().map(PaymentTransaction::try_from).collect()
    }
}
