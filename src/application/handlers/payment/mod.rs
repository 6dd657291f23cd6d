//! Payment handlers.
//!
//! ## Commands
//! - Initiating a hosted-checkout payment
//! - Reconciling a payment against the gateway
//! - Processing gateway webhooks
//! - Cancelling and refunding
//!
//! ## Queries
//! - Get one payment
//! - List an order's payments

mod cancel_payment;
mod get_payment;
mod handle_payment_webhook;
mod initiate_payment;
mod list_order_payments;
mod reconcile_payment;
mod record_refund;

// Commands
pub use cancel_payment::{CancelPaymentCommand, CancelPaymentHandler, CancelPaymentResult};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
pub use initiate_payment::{InitiatePaymentCommand, InitiatePaymentHandler, InitiatePaymentResult};
pub use reconcile_payment::{
    ReconcilePaymentCommand, ReconcilePaymentHandler, ReconcilePaymentResult,
};
pub use record_refund::{RecordRefundCommand, RecordRefundHandler, RecordRefundResult};

// Queries
pub use get_payment::{GetPaymentHandler, GetPaymentQuery};
pub use list_order_payments::{
    ListOrderPaymentsHandler, ListOrderPaymentsQuery, ListOrderPaymentsResult,
};
