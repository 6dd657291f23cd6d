//! Payment gateway port.
//!
//! # Design
//!
//! - **Failures as values**: initiation always yields a `GatewayResult`
//! - **Unknown is not failed**: an exhausted status check yields `None`
//! - **Idempotent by key**: the merchant transaction id identifies the attempt

use async_trait::async_trait;

use crate::domain::foundation::MerchantTransactionId;
use crate::domain::payment::{GatewayResult, PaymentIntent};

/// Default additional attempts for payment initiation.
pub const DEFAULT_INITIATE_RETRIES: u32 = 2;

/// Default additional attempts for status checks.
pub const DEFAULT_STATUS_RETRIES: u32 = 3;

/// Port for the hosted-checkout payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Starts a payment, retrying transient failures up to `max_retries` times.
    ///
    /// Permanent provider errors are returned after a single call.
    async fn initiate_payment(&self, intent: &PaymentIntent, max_retries: u32) -> GatewayResult;

    /// Fetches the provider's view of a payment.
    ///
    /// Returns `None` when credentials are missing or every attempt failed.
    async fn check_status(
        &self,
        merchant_transaction_id: &MerchantTransactionId,
        max_retries: u32,
    ) -> Option<GatewayResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }
}
