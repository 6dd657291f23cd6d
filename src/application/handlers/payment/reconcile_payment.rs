//! ReconcilePaymentHandler - Command handler for settling a payment against the gateway.

use std::sync::Arc;

use crate::application::TransactionRecorder;
use crate::domain::foundation::MerchantTransactionId;
use crate::domain::payment::{PaymentError, PaymentTransaction, StatusUpdate};
use crate::ports::{PaymentGateway, DEFAULT_STATUS_RETRIES};

/// Command to reconcile one payment.
#[derive(Debug, Clone)]
pub struct ReconcilePaymentCommand {
    pub merchant_transaction_id: MerchantTransactionId,
}

/// Result of reconciliation.
#[derive(Debug, Clone)]
pub enum ReconcilePaymentResult {
    /// Gateway reported a state and the record now reflects it.
    Updated { transaction: PaymentTransaction },
    /// Record already holds a decided outcome; gateway not consulted.
    AlreadyFinal { transaction: PaymentTransaction },
    /// Gateway state could not be determined; record untouched.
    Unknown { transaction: PaymentTransaction },
}

impl ReconcilePaymentResult {
    pub fn transaction(&self) -> &PaymentTransaction {
        match self {
            ReconcilePaymentResult::Updated { transaction }
            | ReconcilePaymentResult::AlreadyFinal { transaction }
            | ReconcilePaymentResult::Unknown { transaction } => transaction,
        }
    }
}

/// Handler for payment reconciliation.
///
/// Maps the provider's `COMPLETED`/`FAILED`/`PENDING` to
/// `SUCCESS`/`FAILED`/`PENDING`. An absent status means "unknown" and is
/// never written as `FAILED`.
pub struct ReconcilePaymentHandler {
    gateway: Arc<dyn PaymentGateway>,
    recorder: Arc<TransactionRecorder>,
    max_retries: u32,
}

impl ReconcilePaymentHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>, recorder: Arc<TransactionRecorder>) -> Self {
        Self {
            gateway,
            recorder,
            max_retries: DEFAULT_STATUS_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub async fn handle(
        &self,
        cmd: ReconcilePaymentCommand,
    ) -> Result<ReconcilePaymentResult, PaymentError> {
        let id = &cmd.merchant_transaction_id;

        // 1. Load the record
        let transaction = self
            .recorder
            .get_by_merchant_transaction_id(id)
            .await
            .ok_or_else(|| PaymentError::not_found(id.as_str()))?;

        if transaction.status.is_final() {
            return Ok(ReconcilePaymentResult::AlreadyFinal { transaction });
        }

        // 2. Ask the gateway
        let Some(result) = self.gateway.check_status(id, self.max_retries).await else {
            tracing::warn!(merchant_transaction_id = %id, "Payment status unknown; record unchanged");
            return Ok(ReconcilePaymentResult::Unknown { transaction });
        };

        // 3. Map provider state
        let Some(status) = result
            .transaction_details()
            .and_then(|details| details.state.transaction_status())
        else {
            tracing::warn!(
                merchant_transaction_id = %id,
                code = %result.code,
                "Gateway response carried no usable payment state"
            );
            return Ok(ReconcilePaymentResult::Unknown { transaction });
        };

        // 4. Apply
        let transaction = self
            .recorder
            .apply(id, StatusUpdate::from_provider_response(status, result.raw))
            .await?;

        Ok(ReconcilePaymentResult::Updated { transaction })
    }
}
