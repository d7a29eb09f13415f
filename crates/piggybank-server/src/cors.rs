//! CORS configuration for the tip service.

use actix_cors::Cors;

/// Build the CORS middleware from allowed origins.
///
/// Wildcard (`*`) origins are permitted only in dev mode; production config
/// validation rejects them before this runs. The x402 headers must be
/// explicitly allowed/exposed or browsers will strip them from the exchange.
pub fn build_cors(allowed_origins: &[String]) -> Cors {
    let allowed = allowed_origins.to_vec();
    Cors::default()
        .allowed_origin_fn(move |origin, _req_head| {
            let origin_str = origin.to_str().unwrap_or("");
            allowed.iter().any(|a| a == "*" || a == origin_str)
        })
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::AUTHORIZATION,
            actix_web::http::header::ACCEPT,
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::HeaderName::from_static("x-payment"),
        ])
        .expose_headers(vec![actix_web::http::header::HeaderName::from_static(
            "x-payment-response",
        )])
        .max_age(3600)
}
