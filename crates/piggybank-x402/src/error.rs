use thiserror::Error;

/// Errors returned by x402 operations.
#[derive(Debug, Error)]
pub enum X402Error {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("malformed payment header: {0}")]
    MalformedHeader(String),

    #[error("facilitator error: {0}")]
    Facilitator(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
