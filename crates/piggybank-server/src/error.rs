use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Errors surfaced by the API routes outside the 402 payment exchange
/// (challenge and verify/settle rejections are built inline, since they
/// carry the payment requirements).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing required fields")]
    MissingFields,

    #[error("invalid amount")]
    InvalidAmount,

    #[error("invalid slug: {0}")]
    InvalidSlug(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid display name: {0}")]
    InvalidDisplayName(String),

    #[error("recipient not found")]
    RecipientNotFound,

    #[error("slug already exists: {0}")]
    SlugExists(String),

    #[error("address already registered: {0}")]
    AddressExists(String),

    #[error("donation already recorded: {0}")]
    DuplicateTransaction(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::MissingFields => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Missing required fields: recipientSlug, amount, senderAddress"
            })),
            ApiError::InvalidAmount => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Invalid amount"
            })),
            ApiError::InvalidSlug(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "invalid_slug",
                "message": msg
            })),
            ApiError::InvalidAddress(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "invalid_address",
                "message": msg
            })),
            ApiError::InvalidDisplayName(msg) => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "invalid_display_name",
                    "message": msg
                }))
            }
            ApiError::RecipientNotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "Recipient not found"
            })),
            ApiError::SlugExists(slug) => HttpResponse::Conflict().json(serde_json::json!({
                "error": "slug_exists",
                "message": format!("Slug '{slug}' is already taken")
            })),
            ApiError::AddressExists(address) => HttpResponse::Conflict().json(serde_json::json!({
                "error": "address_exists",
                "message": format!("Address '{address}' already has a profile")
            })),
            ApiError::DuplicateTransaction(tx) => HttpResponse::Conflict().json(
                serde_json::json!({
                    "error": "duplicate_transaction",
                    "message": format!("Donation for transaction '{tx}' already recorded")
                }),
            ),
            ApiError::Database(e) => {
                tracing::error!(error = %e, "database error");
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Internal server error"
                }))
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Internal server error"
                }))
            }
        }
    }
}

/// True when the rusqlite error is a UNIQUE constraint violation.
/// Callers map it to the conflict variant appropriate for their table.
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
