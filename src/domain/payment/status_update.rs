//! Mapping raw provider responses onto transaction record fields.

use serde_json::Value;

use super::provider_response::ProviderResponse;
use super::status::TransactionStatus;

/// Fields of a transaction record that come from the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderFields {
    pub provider_transaction_id: Option<String>,
    pub payment_method: Option<String>,
    pub response_code: Option<String>,
    pub response_message: Option<String>,
}

impl ProviderFields {
    /// Extracts provider fields from a raw response body.
    ///
    /// The detail-level `responseCode` wins over the envelope code.
    pub fn extract(raw: &Value) -> Self {
        let response = ProviderResponse::decode(raw);
        let details = response.details();

        Self {
            provider_transaction_id: details.and_then(|d| d.provider_transaction_id.clone()),
            payment_method: details.and_then(|d| d.payment_method()),
            response_code: details
                .and_then(|d| d.response_code.clone())
                .or_else(|| response.code().map(str::to_string)),
            response_message: response
                .message()
                .filter(|m| !m.is_empty())
                .map(str::to_string),
        }
    }
}

/// A requested status change together with the provider data behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub status: TransactionStatus,
    pub fields: ProviderFields,
    pub raw: Value,
}

impl StatusUpdate {
    /// Builds an update whose provider fields are read from `raw`.
    pub fn from_provider_response(status: TransactionStatus, raw: Value) -> Self {
        Self {
            status,
            fields: ProviderFields::extract(&raw),
            raw,
        }
    }

    /// A status change with no provider payload, e.g. a local cancellation.
    pub fn local(status: TransactionStatus, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            status,
            fields: ProviderFields {
                response_message: Some(reason.clone()),
                ..ProviderFields::default()
            },
            raw: serde_json::json!({ "source": "local", "reason": reason }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_reads_transaction_details() {
        let raw = json!({
            "success": true,
            "code": "PAYMENT_SUCCESS",
            "message": "Your payment is successful.",
            "data": {
                "merchantTransactionId": "TX1",
                "transactionId": "T2401",
                "amount": 10000,
                "state": "COMPLETED",
                "responseCode": "SUCCESS",
                "paymentInstrument": { "type": "CARD", "cardType": "DEBIT_CARD" }
            }
        });

        let fields = ProviderFields::extract(&raw);

        assert_eq!(fields.provider_transaction_id.as_deref(), Some("T2401"));
        assert_eq!(fields.payment_method.as_deref(), Some("CARD"));
        assert_eq!(fields.response_code.as_deref(), Some("SUCCESS"));
        assert_eq!(
            fields.response_message.as_deref(),
            Some("Your payment is successful.")
        );
    }

    #[test]
    fn extract_falls_back_to_envelope_code() {
        let raw = json!({ "success": false, "code": "BAD_REQUEST", "message": "bad" });

        let fields = ProviderFields::extract(&raw);

        assert_eq!(fields.response_code.as_deref(), Some("BAD_REQUEST"));
        assert!(fields.provider_transaction_id.is_none());
        assert!(fields.payment_method.is_none());
    }

    #[test]
    fn extract_from_garbage_is_empty() {
        assert_eq!(ProviderFields::extract(&json!(42)), ProviderFields::default());
    }

    #[test]
    fn local_update_records_reason() {
        let update = StatusUpdate::local(TransactionStatus::Cancelled, "payer abandoned");
        assert_eq!(update.fields.response_message.as_deref(), Some("payer abandoned"));
        assert_eq!(update.raw["source"], "local");
    }
}
