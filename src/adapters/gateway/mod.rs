//! Gateway adapters - HTTP client for the `/pg/v1` API.
//!
//! - `GatewayClient` implements `PaymentGateway` over any `HttpTransport`
//! - `ReqwestTransport` is the production transport
//! - `ScriptedTransport` replays canned replies for tests

mod client;
mod reqwest_transport;
mod retry;
mod scripted_transport;

pub use client::{GatewayClient, DEFAULT_REQUEST_TIMEOUT, PAY_ENDPOINT};
pub use reqwest_transport::ReqwestTransport;
pub use retry::{Backoff, RetryFailure, RetryPolicy};
pub use scripted_transport::{RecordedCall, ScriptedReply, ScriptedTransport};
