//! Transport codec for the `X-PAYMENT` and `X-PAYMENT-RESPONSE` headers.
//!
//! Both headers carry base64-encoded JSON. Decoding performs no semantic or
//! cryptographic validation — that is strictly the facilitator's job.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::payment::PaymentPayload;
use crate::X402Error;

/// Settlement receipt echoed back to the client in `X-PAYMENT-RESPONSE`,
/// so it can confirm the transfer without a second request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    pub network: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
    /// Settled amount in the asset's smallest unit.
    pub amount: String,
    pub token: String,
    /// Recipient's payout address.
    pub recipient: String,
}

/// Decode the `X-PAYMENT` header into a payment payload.
pub fn decode_payment(header_value: &str) -> Result<PaymentPayload, X402Error> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(header_value.trim())
        .map_err(|e| X402Error::MalformedHeader(format!("invalid base64: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| X402Error::MalformedHeader(format!("invalid JSON payload: {e}")))
}

/// Base64-encode a payment payload. Used by clients and tests; the server
/// only decodes.
pub fn encode_payment(payload: &PaymentPayload) -> Result<String, X402Error> {
    let json = serde_json::to_vec(payload)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(json))
}

/// Encode a settlement receipt for the `X-PAYMENT-RESPONSE` header.
pub fn encode_receipt(receipt: &PaymentReceipt) -> Result<String, X402Error> {
    let json = serde_json::to_vec(receipt)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(json))
}

/// Decode an `X-PAYMENT-RESPONSE` header back into a receipt.
pub fn decode_receipt(header_value: &str) -> Result<PaymentReceipt, X402Error> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(header_value.trim())
        .map_err(|e| X402Error::MalformedHeader(format!("invalid base64: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| X402Error::MalformedHeader(format!("invalid JSON receipt: {e}")))
}
