//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `gateway` - Signed HTTP client for the payment gateway
//! - `store` - Transaction stores (in-memory, PostgreSQL)
//! - `http` - REST API over the application handlers

pub mod gateway;
pub mod http;
pub mod store;
