//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, the state machine trait and validation errors
//! that the payment domain is built from.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use ids::{MerchantTransactionId, OrderId, TransactionId, MAX_MERCHANT_TRANSACTION_ID_LEN};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
