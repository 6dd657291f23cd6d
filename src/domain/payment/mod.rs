//! Payment domain - signing, payloads, provider responses and the
//! transaction state machine.

mod credentials;
mod errors;
mod gateway_result;
mod intent;
mod payload;
mod provider_response;
mod signer;
mod status;
mod status_update;
mod transaction;
mod webhook;

pub use credentials::MerchantCredentials;
pub use errors::PaymentError;
pub use gateway_result::{GatewayData, GatewayResult, UNRECOGNIZED_RESPONSE_CODE};
pub use intent::{DeviceContext, PaymentIntent};
pub use payload::{
    build_initiation_payload, EncodedPayload, InitiationPayload, PaymentInstrument,
    PAY_PAGE_INSTRUMENT, REDIRECT_MODE,
};
pub use provider_response::{
    KnownErrorCode, ProviderPaymentState, ProviderResponse, RedirectInfo, TransactionDetails,
};
pub use signer::{RequestSigner, SignedRequest, CHECKSUM_SEPARATOR};
pub use status::TransactionStatus;
pub use status_update::{ProviderFields, StatusUpdate};
pub use transaction::PaymentTransaction;
pub use webhook::{WebhookError, WebhookVerifier};
