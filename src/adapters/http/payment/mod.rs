//! HTTP adapter for payment endpoints.
//!
//! - `POST /payments` - Start a payment
//! - `GET /payments/:merchant_transaction_id` - Get one payment
//! - `POST /payments/:merchant_transaction_id/{reconcile,cancel,refund}`
//! - `GET /orders/:order_id/payments` - List an order's payments
//! - `POST /webhooks/gateway` - Gateway notifications (checksum verified)

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{PaymentApiError, PaymentAppState, CHECKSUM_HEADER};
pub use routes::{payment_router, payment_routes, webhook_routes};
