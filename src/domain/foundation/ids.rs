//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Longest merchant transaction id the gateway accepts.
pub const MAX_MERCHANT_TRANSACTION_ID_LEN: usize = 38;

/// Store-assigned identifier of a payment transaction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Creates a new random TransactionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a TransactionId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Reference to the order a payment belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Creates a new OrderId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("order_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-generated idempotency key for one payment attempt.
///
/// The gateway restricts it to at most 38 characters of `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MerchantTransactionId(String);

impl MerchantTransactionId {
    /// Creates a new MerchantTransactionId after validating its alphabet and length.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::empty_field("merchant_transaction_id"));
        }
        if id.len() > MAX_MERCHANT_TRANSACTION_ID_LEN {
            return Err(ValidationError::too_long(
                "merchant_transaction_id",
                MAX_MERCHANT_TRANSACTION_ID_LEN,
                id.len(),
            ));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ValidationError::invalid_format(
                "merchant_transaction_id",
                "only letters, digits, '_' and '-' are allowed",
            ));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MerchantTransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for MerchantTransactionId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MerchantTransactionId> for String {
    fn from(id: MerchantTransactionId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_id_round_trips_through_string() {
        let id = TransactionId::new();
        let parsed: TransactionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn order_id_rejects_blank() {
        assert!(OrderId::new("   ").is_err());
        assert_eq!(OrderId::new("ORD-1").unwrap().as_str(), "ORD-1");
    }

    #[test]
    fn merchant_transaction_id_accepts_provider_alphabet() {
        let id = MerchantTransactionId::new("TX_2024-01").unwrap();
        assert_eq!(id.as_str(), "TX_2024-01");
    }

    #[test]
    fn merchant_transaction_id_rejects_empty() {
        assert_eq!(
            MerchantTransactionId::new(""),
            Err(ValidationError::empty_field("merchant_transaction_id"))
        );
    }

    #[test]
    fn merchant_transaction_id_rejects_overlong() {
        let id = "A".repeat(39);
        assert!(matches!(
            MerchantTransactionId::new(id),
            Err(ValidationError::TooLong { max: 38, actual: 39, .. })
        ));
    }

    #[test]
    fn merchant_transaction_id_rejects_separators_and_spaces() {
        assert!(MerchantTransactionId::new("TX 1").is_err());
        assert!(MerchantTransactionId::new("TX/1").is_err());
    }

    #[test]
    fn merchant_transaction_id_deserialization_validates() {
        let ok: Result<MerchantTransactionId, _> = serde_json::from_str("\"TX1\"");
        assert!(ok.is_ok());

        let bad: Result<MerchantTransactionId, _> = serde_json::from_str("\"TX 1\"");
        assert!(bad.is_err());
    }
}
