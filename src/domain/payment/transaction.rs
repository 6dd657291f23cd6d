//! Payment transaction record.
//!
//! # Design Decisions
//!
//! - **Created INITIATED**: the record exists before the first gateway call
//! - **Money in minor units**: amounts are i64 in the smallest currency unit
//! - **Never deleted**: retention belongs to the store
//! - **Validated transitions**: status only moves along reachable edges

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{MerchantTransactionId, OrderId, Timestamp, TransactionId};

use super::errors::PaymentError;
use super::status::TransactionStatus;
use super::status_update::StatusUpdate;

/// A persisted payment attempt.
///
/// # Invariants
///
/// - `merchant_transaction_id` is unique across all records
/// - `status` only changes through [`PaymentTransaction::apply_update`]
/// - `created_at <= updated_at`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: TransactionId,
    pub order_id: OrderId,
    pub merchant_transaction_id: MerchantTransactionId,
    pub amount: i64,
    pub status: TransactionStatus,

    /// Assigned by the provider once it has seen the payment.
    pub provider_transaction_id: Option<String>,
    pub payment_method: Option<String>,
    pub provider_response_code: Option<String>,
    pub provider_response_message: Option<String>,

    /// Last provider response, stored verbatim for audit.
    pub provider_response: Option<Value>,

    /// Caller-supplied data attached at creation.
    pub metadata: Value,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentTransaction {
    /// Creates a fresh record in `INITIATED`.
    pub fn initiate(
        id: TransactionId,
        order_id: OrderId,
        merchant_transaction_id: MerchantTransactionId,
        amount: i64,
        metadata: Value,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            order_id,
            merchant_transaction_id,
            amount,
            status: TransactionStatus::Initiated,
            provider_transaction_id: None,
            payment_method: None,
            provider_response_code: None,
            provider_response_message: None,
            provider_response: None,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a status update after checking the transition is allowed.
    ///
    /// Provider fields absent from the update keep their previous values.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if `update.status` is neither the current
    /// status nor reachable from it.
    pub fn apply_update(&mut self, update: &StatusUpdate) -> Result<(), PaymentError> {
        if !self.status.accepts(&update.status) {
            return Err(PaymentError::invalid_transition(self.status, update.status));
        }

        self.status = update.status;

        let fields = update.fields.clone();
        if fields.provider_transaction_id.is_some() {
            self.provider_transaction_id = fields.provider_transaction_id;
        }
        if fields.payment_method.is_some() {
            self.payment_method = fields.payment_method;
        }
        if fields.response_code.is_some() {
            self.provider_response_code = fields.response_code;
        }
        if fields.response_message.is_some() {
            self.provider_response_message = fields.response_message;
        }
        self.provider_response = Some(update.raw.clone());
        self.updated_at = Timestamp::now();

        Ok(())
    }
}
