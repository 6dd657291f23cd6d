//! Axum router configuration for payment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    cancel_payment, get_payment, handle_gateway_webhook, initiate_payment, list_order_payments,
    reconcile_payment, record_refund, PaymentAppState,
};

/// Payment endpoints.
///
/// # Routes
/// - `POST /payments` - Start a payment
/// - `GET /payments/:merchant_transaction_id` - Get one payment
/// - `POST /payments/:merchant_transaction_id/reconcile` - Settle against the gateway
/// - `POST /payments/:merchant_transaction_id/cancel` - Cancel an undecided payment
/// - `POST /payments/:merchant_transaction_id/refund` - Record a refund
/// - `GET /orders/:order_id/payments` - List an order's payments
pub fn payment_routes() -> Router<PaymentAppState> {
    Router::new()
        .route("/payments", post(initiate_payment))
        .route("/payments/:merchant_transaction_id", get(get_payment))
        .route(
            "/payments/:merchant_transaction_id/reconcile",
            post(reconcile_payment),
        )
        .route("/payments/:merchant_transaction_id/cancel", post(cancel_payment))
        .route("/payments/:merchant_transaction_id/refund", post(record_refund))
        .route("/orders/:order_id/payments", get(list_order_payments))
}

/// Webhook endpoints. Authenticated by checksum, not by caller identity.
///
/// # Routes
/// - `POST /gateway` - Gateway notifications
pub fn webhook_routes() -> Router<PaymentAppState> {
    Router::new().route("/gateway", post(handle_gateway_webhook))
}

/// Complete payment router: payment routes at the root, webhooks under `/webhooks`.
///
/// ```ignore
/// let app = payment_router().with_state(state);
/// ```
pub fn payment_router() -> Router<PaymentAppState> {
    payment_routes().nest("/webhooks", webhook_routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::{GatewayClient, ScriptedTransport};
    use crate::adapters::store::InMemoryTransactionStore;
    use crate::application::TransactionRecorder;
    use crate::domain::payment::WebhookVerifier;
    use std::sync::Arc;

    fn test_state() -> PaymentAppState {
        let gateway = GatewayClient::new(None, "https://gateway.test", Arc::new(ScriptedTransport::new()));
        PaymentAppState::new(
            Arc::new(gateway),
            Arc::new(TransactionRecorder::new(Arc::new(InMemoryTransactionStore::new()))),
            Arc::new(WebhookVerifier::new(None)),
        )
    }

    #[test]
    fn payment_router_creates_router() {
        let _: Router<()> = payment_router().with_state(test_state());
    }
}
