//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine trait)
//! - `payment` - Signing, payloads, provider responses and the transaction lifecycle

pub mod foundation;
pub mod payment;
