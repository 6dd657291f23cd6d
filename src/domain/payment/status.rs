//! Payment transaction status state machine.
//!
//! ```text
//! INITIATED ──► PENDING ──► SUCCESS ──► REFUNDED
//!     │            │    └──► FAILED
//!     └────────────┴──► CANCELLED
//! ```

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a payment transaction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Record created, gateway not yet called or not yet answered.
    Initiated,

    /// Gateway accepted the request; payer has not finished.
    Pending,

    /// Payment captured.
    Success,

    /// Payment declined or errored at the provider.
    Failed,

    /// Captured payment was refunded.
    Refunded,

    /// Abandoned before an outcome was decided.
    Cancelled,
}

impl TransactionStatus {
    /// Returns true once the payment outcome is decided.
    ///
    /// `Success` is final but not terminal: it can still be refunded.
    pub fn is_final(&self) -> bool {
        !matches!(self, TransactionStatus::Initiated | TransactionStatus::Pending)
    }

    /// Returns true if a record in this status may be moved to `target`.
    ///
    /// Re-applying the current status is a refresh and always accepted.
    /// Otherwise `target` must be a direct edge, or reachable through
    /// undecided statuses only: `INITIATED -> FAILED` passes through
    /// `PENDING`, but `PENDING -> REFUNDED` would skip over `SUCCESS`.
    pub fn accepts(&self, target: &TransactionStatus) -> bool {
        self == target || self.reaches_without_deciding(target)
    }

    fn reaches_without_deciding(&self, target: &TransactionStatus) -> bool {
        self.valid_transitions().into_iter().any(|next| {
            next == *target || (!next.is_final() && next.reaches_without_deciding(target))
        })
    }

    /// Wire and storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Initiated => "INITIATED",
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Success => "SUCCESS",
            TransactionStatus::Failed => "FAILED",
            TransactionStatus::Refunded => "REFUNDED",
            TransactionStatus::Cancelled => "CANCELLED",
        }
    }
}

impl StateMachine for TransactionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TransactionStatus::*;
        matches!(
            (self, target),
            (Initiated, Pending)
                | (Initiated, Cancelled)
                | (Pending, Success)
                | (Pending, Failed)
                | (Pending, Cancelled)
                | (Success, Refunded)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TransactionStatus::*;
        match self {
            Initiated => vec![Pending, Cancelled],
            Pending => vec![Success, Failed, Cancelled],
            Success => vec![Refunded],
            Failed | Refunded | Cancelled => vec![],
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIATED" => Ok(TransactionStatus::Initiated),
            "PENDING" => Ok(TransactionStatus::Pending),
            "SUCCESS" => Ok(TransactionStatus::Success),
            "FAILED" => Ok(TransactionStatus::Failed),
            "REFUNDED" => Ok(TransactionStatus::Refunded),
            "CANCELLED" => Ok(TransactionStatus::Cancelled),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown transaction status '{}'", other),
            )),
        }
    }
}
