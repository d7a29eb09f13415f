use serde::{Deserialize, Serialize};

/// Client-constructed payment proof, opaque to this system.
///
/// The facilitator owns all semantic and cryptographic validation; we decode
/// only the base64/JSON transport envelope and forward the parsed value
/// verbatim. See [`crate::header::decode_payment`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentPayload(pub serde_json::Value);

/// Scheme-specific metadata for signature domain separation
/// (EIP-712 domain name/version of the payment token).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetExtra {
    pub name: String,
    pub version: String,
}

/// A single entry in the `accepts` array of a 402 challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    pub scheme: String,
    pub network: String,
    /// Amount in the asset's smallest unit, rendered as an integer string.
    pub max_amount_required: String,
    /// URL of the protected action; binds the proof to this resource.
    pub resource: String,
    pub description: String,
    pub mime_type: String,
    /// Recipient's registered payout address. Never client-supplied.
    pub pay_to: String,
    pub max_timeout_seconds: u64,
    /// Payment token contract address.
    pub asset: String,
    pub extra: AssetExtra,
}

/// The 402 challenge body returned when no payment header is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequiredBody {
    pub x402_version: u32,
    pub error: String,
    pub accepts: Vec<PaymentRequirements>,
}
