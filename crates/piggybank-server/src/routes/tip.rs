//! The tip payment exchange: challenge, verify, settle, record.
//!
//! State order is strict: a settlement is attempted only after a successful
//! verify, the ledger write only after a successful settlement, and the
//! success response only after the settlement — funds move before the
//! system claims success. Nothing here retries a facilitator call; every
//! retry decision belongs to the client, which must obtain a fresh proof.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use x402::{
    build_requirements, decode_payment, encode_receipt, Facilitator, PaymentReceipt,
    PaymentRequiredBody, PaymentRequirements, X402Error, X402_VERSION,
};

use crate::db::{DonationStatus, NewDonation, Recipient};
use crate::error::ApiError;
use crate::metrics::{DONATIONS_RECORDED, DONATION_WRITE_FAILURES, SETTLE_LATENCY, TIP_REQUESTS};
use crate::state::AppState;

/// Longest message stored with a donation; anything beyond is dropped.
const MAX_MESSAGE_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTipRequest {
    #[serde(default)]
    pub recipient_slug: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub sender_address: Option<String>,
}

#[derive(Debug, Serialize)]
struct DonationSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    amount: String,
    recipient: String,
}

#[derive(Debug, Serialize)]
struct SendTipResponse {
    success: bool,
    donation: DonationSummary,
}

/// 402 body for a rejected (not merely absent) payment.
#[derive(Debug, Serialize)]
struct PaymentRejectedBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

fn require_field<'a>(value: &'a Option<String>) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::MissingFields),
    }
}

/// The URL of the protected action, embedded in the requirements so a
/// settled proof cannot be replayed against a different resource.
fn resource_url<F: Facilitator>(req: &HttpRequest, state: &AppState<F>) -> String {
    match state.config.public_base_url {
        Some(ref base) => format!("{}{}", base.trim_end_matches('/'), req.uri().path()),
        None => {
            let info = req.connection_info();
            format!("{}://{}{}", info.scheme(), info.host(), req.uri().path())
        }
    }
}

/// Trim and bound the donor message; empty messages collapse to None.
fn bounded_message(message: Option<&str>) -> Option<String> {
    let trimmed = message?.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((idx, _)) => Some(trimmed[..idx].to_string()),
        None => Some(trimmed.to_string()),
    }
}

fn challenge_response(requirements: PaymentRequirements) -> HttpResponse {
    TIP_REQUESTS.with_label_values(&["challenge"]).inc();
    HttpResponse::PaymentRequired().json(PaymentRequiredBody {
        x402_version: X402_VERSION,
        error: "X-PAYMENT header is required".to_string(),
        accepts: vec![requirements],
    })
}

/// POST /api/send-tip
pub async fn send_tip<F: Facilitator>(
    req: HttpRequest,
    body: web::Json<SendTipRequest>,
    state: web::Data<AppState<F>>,
) -> Result<HttpResponse, ApiError> {
    let slug = require_field(&body.recipient_slug)?.to_lowercase();
    let amount = require_field(&body.amount)?.to_string();
    let sender_address = require_field(&body.sender_address)?.to_lowercase();

    // Recipient resolution precedes all payment logic — the challenge
    // embeds the payout address.
    let recipient: Recipient = state
        .db
        .get_recipient(&slug)?
        .ok_or(ApiError::RecipientNotFound)?;

    let display_name = recipient
        .display_name
        .clone()
        .unwrap_or_else(|| recipient.slug.clone());

    let description = format!(
        "Tip {amount} {} to {display_name}",
        state.config.asset.symbol
    );
    let resource = resource_url(&req, &state);

    let requirements = build_requirements(
        &recipient.address,
        &amount,
        &resource,
        &description,
        &state.config.asset,
    )
    .map_err(|e| match e {
        X402Error::InvalidAmount(_) => ApiError::InvalidAmount,
        other => ApiError::Internal(other.to_string()),
    })?;

    // NO_HEADER: emit the challenge. Not an error — the client is expected
    // to construct a proof against accepts[0] and resubmit.
    let payment_header = match req.headers().get("X-PAYMENT") {
        None => return Ok(challenge_response(requirements)),
        // A present-but-unreadable header is a client bug, not absence
        Some(value) => match value.to_str() {
            Ok(h) => h.to_string(),
            Err(_) => {
                TIP_REQUESTS.with_label_values(&["invalid_header"]).inc();
                return Ok(HttpResponse::PaymentRequired().json(PaymentRejectedBody {
                    error: "Invalid X-PAYMENT header format",
                    reason: None,
                }));
            }
        },
    };

    // DECODING: transport envelope only; a failure here is a client bug,
    // distinct from the absent-payment state above.
    let payload = match decode_payment(&payment_header) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, slug = %slug, "invalid payment header");
            TIP_REQUESTS.with_label_values(&["invalid_header"]).inc();
            return Ok(HttpResponse::PaymentRequired().json(PaymentRejectedBody {
                error: "Invalid X-PAYMENT header format",
                reason: None,
            }));
        }
    };

    // VERIFYING
    let verify = match state.facilitator.verify(&payload, &requirements).await {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, slug = %slug, "facilitator verify error");
            TIP_REQUESTS.with_label_values(&["facilitator_error"]).inc();
            return Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Payment verification failed",
                "details": e.to_string(),
            })));
        }
    };

    if !verify.is_valid {
        tracing::warn!(
            slug = %slug,
            reason = verify.invalid_reason.as_deref().unwrap_or("unknown"),
            "payment verification rejected"
        );
        TIP_REQUESTS.with_label_values(&["verify_rejected"]).inc();
        return Ok(HttpResponse::PaymentRequired().json(PaymentRejectedBody {
            error: "Payment verification failed",
            reason: verify.invalid_reason,
        }));
    }

    tracing::info!(
        slug = %slug,
        payer = verify.payer.as_deref().unwrap_or("unknown"),
        "payment verified"
    );

    // SETTLING: funds move here. An ambiguous outcome (transport error,
    // timeout) is a 500 and is never retried — resubmitting could
    // double-settle.
    let settle_started = std::time::Instant::now();
    let settle = match state.facilitator.settle(&payload, &requirements).await {
        Ok(s) => s,
        Err(e) => {
            SETTLE_LATENCY.observe(settle_started.elapsed().as_secs_f64());
            tracing::error!(error = %e, slug = %slug, "facilitator settle error");
            TIP_REQUESTS.with_label_values(&["facilitator_error"]).inc();
            return Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Payment settlement failed",
                "details": e.to_string(),
            })));
        }
    };
    SETTLE_LATENCY.observe(settle_started.elapsed().as_secs_f64());

    if !settle.success {
        tracing::warn!(
            slug = %slug,
            reason = settle.error_reason.as_deref().unwrap_or("unknown"),
            "payment settlement rejected"
        );
        TIP_REQUESTS.with_label_values(&["settle_rejected"]).inc();
        return Ok(HttpResponse::PaymentRequired().json(PaymentRejectedBody {
            error: "Payment settlement failed",
            reason: settle.error_reason,
        }));
    }

    tracing::info!(
        slug = %slug,
        tx = settle.transaction.as_deref().unwrap_or("unknown"),
        network = %settle.network,
        payer = settle.payer.as_deref().unwrap_or("unknown"),
        "payment settled"
    );

    // RECORDING: the payment has settled, so a ledger failure from here on
    // must not surface as a payment failure — it is logged for manual
    // reconciliation and the client still sees success.
    let tx_hash = settle.transaction.clone().unwrap_or_else(|| {
        format!("x402-{}", chrono::Utc::now().timestamp_millis())
    });

    let donation_id = match state.db.record_donation(NewDonation {
        tx_hash,
        from_address: sender_address,
        to_address: recipient.address.clone(),
        token_address: state.config.asset.asset.clone(),
        token_symbol: state.config.asset.symbol.clone(),
        token_decimals: state.config.asset.decimals,
        amount_raw: requirements.max_amount_required.clone(),
        amount_formatted: amount.clone(),
        message: bounded_message(body.message.as_deref()),
        status: DonationStatus::Confirmed,
        transaction_timestamp: chrono::Utc::now().timestamp(),
    }) {
        Ok(donation) => {
            DONATIONS_RECORDED.inc();
            tracing::info!(donation_id = donation.id, slug = %slug, "donation recorded");
            Some(donation.id)
        }
        Err(e) => {
            DONATION_WRITE_FAILURES.inc();
            tracing::warn!(
                error = %e,
                slug = %slug,
                tx = settle.transaction.as_deref().unwrap_or("unknown"),
                "donation ledger write failed after settlement; manual reconciliation required"
            );
            None
        }
    };

    // FULFILLED: echo the settlement back in X-PAYMENT-RESPONSE.
    let receipt = PaymentReceipt {
        success: true,
        transaction: settle.transaction.clone(),
        network: settle.network.clone(),
        payer: settle.payer.clone(),
        amount: requirements.max_amount_required.clone(),
        token: state.config.asset.symbol.clone(),
        recipient: recipient.address.clone(),
    };

    TIP_REQUESTS.with_label_values(&["fulfilled"]).inc();

    let mut response = HttpResponse::Ok();
    match encode_receipt(&receipt) {
        Ok(header_value) => {
            response.insert_header(("X-PAYMENT-RESPONSE", header_value));
        }
        Err(e) => tracing::warn!(error = %e, "failed to encode payment receipt header"),
    }

    Ok(response.json(SendTipResponse {
        success: true,
        donation: DonationSummary {
            id: donation_id,
            amount,
            recipient: display_name,
        },
    }))
}

pub fn configure<F: Facilitator + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/send-tip", web::post().to(send_tip::<F>));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_field() {
        assert!(require_field(&None).is_err());
        assert!(require_field(&Some("".to_string())).is_err());
        assert!(require_field(&Some("   ".to_string())).is_err());
        assert_eq!(require_field(&Some(" alice ".to_string())).unwrap(), "alice");
    }

    #[test]
    fn test_bounded_message() {
        assert_eq!(bounded_message(None), None);
        assert_eq!(bounded_message(Some("   ")), None);
        assert_eq!(bounded_message(Some(" hi ")), Some("hi".to_string()));

        let long = "x".repeat(600);
        let bounded = bounded_message(Some(&long)).unwrap();
        assert_eq!(bounded.chars().count(), MAX_MESSAGE_CHARS);
    }

    #[test]
    fn test_bounded_message_multibyte_boundary() {
        let long: String = "é".repeat(600);
        let bounded = bounded_message(Some(&long)).unwrap();
        assert_eq!(bounded.chars().count(), MAX_MESSAGE_CHARS);
    }
}
