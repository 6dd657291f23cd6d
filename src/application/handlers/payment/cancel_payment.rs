//! CancelPaymentHandler - Command handler for abandoning an undecided payment.

use std::sync::Arc;

use crate::application::TransactionRecorder;
use crate::domain::foundation::MerchantTransactionId;
use crate::domain::payment::{PaymentError, PaymentTransaction, StatusUpdate, TransactionStatus};

const DEFAULT_REASON: &str = "Cancelled by merchant";

/// Command to cancel a payment.
#[derive(Debug, Clone)]
pub struct CancelPaymentCommand {
    pub merchant_transaction_id: MerchantTransactionId,
    pub reason: Option<String>,
}

/// Result of cancellation.
#[derive(Debug, Clone)]
pub struct CancelPaymentResult {
    pub transaction: PaymentTransaction,
}

/// Handler for cancelling payments.
///
/// Only `INITIATED` and `PENDING` records can be cancelled; cancelling an
/// already cancelled record is a no-op refresh.
pub struct CancelPaymentHandler {
    recorder: Arc<TransactionRecorder>,
}

impl CancelPaymentHandler {
    pub fn new(recorder: Arc<TransactionRecorder>) -> Self {
        Self { recorder }
    }

    pub async fn handle(&self, cmd: CancelPaymentCommand) -> Result<CancelPaymentResult, PaymentError> {
        let reason = cmd.reason.unwrap_or_else(|| DEFAULT_REASON.to_string());
        let transaction = self
            .recorder
            .apply(
                &cmd.merchant_transaction_id,
                StatusUpdate::local(TransactionStatus::Cancelled, reason),
            )
            .await?;

        Ok(CancelPaymentResult { transaction })
    }
}
