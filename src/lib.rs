//! Payment Gateway Client - hosted-checkout payments over a checksum-signed API
//!
//! This crate signs and sends payment initiation and status requests with
//! bounded retry, verifies gateway webhooks, and keeps each payment's record
//! moving only along legal status transitions.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
