//! The recipient directory: registration, profile lookup, slug availability,
//! and donation history.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use x402::Facilitator;

use crate::error::ApiError;
use crate::metrics::RECIPIENTS_REGISTERED;
use crate::state::AppState;
use crate::validation::{validate_address, validate_display_name, validate_slug};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipientRequest {
    pub slug: String,
    pub address: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// POST /api/recipients - Register a new recipient profile
pub async fn create_recipient<F: Facilitator>(
    body: web::Json<CreateRecipientRequest>,
    state: web::Data<AppState<F>>,
) -> Result<HttpResponse, ApiError> {
    let slug = body.slug.trim().to_lowercase();
    let address = body.address.trim().to_lowercase();
    let display_name = body
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    validate_slug(&slug)?;
    validate_address(&address)?;
    if let Some(name) = display_name {
        validate_display_name(name)?;
    }

    // UNIQUE constraints on slug and address are the real gate; the insert
    // maps violations to 409 so two racing registrations cannot both win.
    let recipient = state.db.create_recipient(&slug, &address, display_name)?;

    RECIPIENTS_REGISTERED.inc();
    tracing::info!(slug = %recipient.slug, address = %recipient.address, "recipient registered");

    Ok(HttpResponse::Created().json(recipient))
}

/// GET /api/recipients/{slug} - Public profile lookup
pub async fn get_recipient<F: Facilitator>(
    path: web::Path<String>,
    state: web::Data<AppState<F>>,
) -> Result<HttpResponse, ApiError> {
    let slug = path.into_inner().to_lowercase();

    let recipient = state
        .db
        .get_recipient(&slug)?
        .ok_or(ApiError::RecipientNotFound)?;

    Ok(HttpResponse::Ok().json(recipient))
}

#[derive(Debug, Deserialize)]
pub struct CheckSlugQuery {
    #[serde(default)]
    pub slug: Option<String>,
}

/// GET /api/check-slug?slug=... - Slug availability probe
pub async fn check_slug<F: Facilitator>(
    query: web::Query<CheckSlugQuery>,
    state: web::Data<AppState<F>>,
) -> Result<HttpResponse, ApiError> {
    let slug = match query.slug.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_lowercase(),
        _ => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Slug is required"
            })))
        }
    };

    // An invalid slug is reported as unavailable with the reason, so the
    // client can surface it inline instead of round-tripping a registration.
    if let Err(e) = validate_slug(&slug) {
        return Ok(HttpResponse::Ok().json(serde_json::json!({
            "available": false,
            "slug": slug,
            "reason": e.to_string(),
        })));
    }

    let available = state.db.slug_available(&slug)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "available": available,
        "slug": slug,
    })))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    20
}

/// GET /api/recipients/{slug}/donations - Confirmed donations, most recent
/// first. `limit` is clamped to 100 by the store.
pub async fn donation_history<F: Facilitator>(
    path: web::Path<String>,
    query: web::Query<HistoryQuery>,
    state: web::Data<AppState<F>>,
) -> Result<HttpResponse, ApiError> {
    let slug = path.into_inner().to_lowercase();

    let recipient = state
        .db
        .get_recipient(&slug)?
        .ok_or(ApiError::RecipientNotFound)?;

    let donations = state
        .db
        .donations_for_recipient(&recipient.address, query.limit, query.offset)?;
    let count = donations.len();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "recipient": recipient.slug,
        "donations": donations,
        "count": count,
    })))
}

pub fn configure<F: Facilitator + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/recipients", web::post().to(create_recipient::<F>))
        .route("/api/recipients/{slug}", web::get().to(get_recipient::<F>))
        .route(
            "/api/recipients/{slug}/donations",
            web::get().to(donation_history::<F>),
        )
        .route("/api/check-slug", web::get().to(check_slug::<F>));
}
