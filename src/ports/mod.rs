//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentGateway` - Payment initiation and status checks
//! - `HttpTransport` - Raw HTTP exchange used by the gateway client
//! - `TransactionStore` - Persistence of payment transaction records

mod http_transport;
mod payment_gateway;
mod transaction_store;

pub use http_transport::{
    HttpMethod, HttpTransport, TransportError, TransportRequest, TransportResponse,
};
pub use payment_gateway::{PaymentGateway, DEFAULT_INITIATE_RETRIES, DEFAULT_STATUS_RETRIES};
pub use transaction_store::{NewTransaction, StoreError, TransactionStore};
