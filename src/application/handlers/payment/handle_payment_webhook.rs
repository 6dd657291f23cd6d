//! HandlePaymentWebhookHandler - Command handler for gateway server-to-server notifications.

use std::sync::Arc;

use crate::application::TransactionRecorder;
use crate::domain::foundation::{MerchantTransactionId, ValidationError};
use crate::domain::payment::{
    PaymentError, PaymentTransaction, StatusUpdate, WebhookError, WebhookVerifier,
};

/// Command to handle a webhook notification.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Base64 body from the `response` field.
    pub response: String,
    /// `X-VERIFY` header, if present.
    pub checksum: Option<String>,
}

/// Result of webhook processing.
#[derive(Debug, Clone)]
pub enum HandlePaymentWebhookResult {
    /// Notification verified and applied to the record.
    Applied { transaction: PaymentTransaction },
    /// Notification verified but carried no actionable payment state.
    Ignored { code: Option<String> },
}

/// Handler for gateway webhooks.
///
/// Nothing in the body is trusted until the checksum matches.
pub struct HandlePaymentWebhookHandler {
    verifier: Arc<WebhookVerifier>,
    recorder: Arc<TransactionRecorder>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(verifier: Arc<WebhookVerifier>, recorder: Arc<TransactionRecorder>) -> Self {
        Self { verifier, recorder }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, PaymentError> {
        // 1. Verify checksum and decode
        let (response, raw) = self
            .verifier
            .verify_and_decode(&cmd.response, cmd.checksum.as_deref())
            .map_err(|err| match err {
                WebhookError::Decode(reason) => {
                    PaymentError::from(ValidationError::invalid_format("response", reason))
                }
                other => PaymentError::VerificationFailure(other.to_string()),
            })?;

        // 2. Extract the reported state
        let Some(details) = response.details() else {
            tracing::info!(
                code = response.code().unwrap_or("UNRECOGNIZED"),
                "Webhook carried no transaction details; ignored"
            );
            return Ok(HandlePaymentWebhookResult::Ignored {
                code: response.code().map(str::to_string),
            });
        };

        let merchant_transaction_id = MerchantTransactionId::new(details.merchant_transaction_id.clone())?;

        let Some(status) = details.state.transaction_status() else {
            tracing::info!(
                merchant_transaction_id = %merchant_transaction_id,
                "Webhook reported an unrecognized payment state; ignored"
            );
            return Ok(HandlePaymentWebhookResult::Ignored {
                code: response.code().map(str::to_string),
            });
        };

        // 3. Apply through the state machine
        let transaction = self
            .recorder
            .apply(
                &merchant_transaction_id,
                StatusUpdate::from_provider_response(status, raw),
            )
            .await?;

        Ok(HandlePaymentWebhookResult::Applied { transaction })
    }
}
