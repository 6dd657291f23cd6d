//! Application layer - Commands, Queries, and Handlers.
//!
//! Handlers orchestrate the payment domain over the gateway and store ports.
//! `TransactionRecorder` is the single path by which records change status.

pub mod handlers;
mod transaction_recorder;

pub use transaction_recorder::TransactionRecorder;

pub use handlers::{
    // Payment commands
    CancelPaymentCommand, CancelPaymentHandler, CancelPaymentResult,
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
    InitiatePaymentCommand, InitiatePaymentHandler, InitiatePaymentResult,
    ReconcilePaymentCommand, ReconcilePaymentHandler, ReconcilePaymentResult,
    RecordRefundCommand, RecordRefundHandler, RecordRefundResult,
    // Payment queries
    GetPaymentHandler, GetPaymentQuery,
    ListOrderPaymentsHandler, ListOrderPaymentsQuery, ListOrderPaymentsResult,
};
