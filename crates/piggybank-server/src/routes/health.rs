use actix_web::{web, HttpRequest, HttpResponse};
use x402::security::constant_time_eq;
use x402::Facilitator;

use crate::metrics::metrics_output;
use crate::state::AppState;

/// GET /health - Health check endpoint
pub async fn health<F: Facilitator>(state: web::Data<AppState<F>>) -> HttpResponse {
    let mut response = serde_json::json!({
        "status": "ok",
        "service": "piggybank-server",
        "version": env!("CARGO_PKG_VERSION"),
    });

    if let Err(e) = state.db.ping() {
        tracing::warn!(error = %e, "health check: database unreachable");
        response["status"] = serde_json::json!("degraded");
        response["database"] = serde_json::json!("unreachable");
        return HttpResponse::ServiceUnavailable().json(response);
    }

    HttpResponse::Ok().json(response)
}

/// GET /metrics - Prometheus metrics endpoint (auth-gated)
pub async fn metrics<F: Facilitator>(
    req: HttpRequest,
    state: web::Data<AppState<F>>,
) -> HttpResponse {
    match state.config.metrics_token {
        Some(ref expected_token) => {
            let authorized = req
                .headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|token| constant_time_eq(token.as_bytes(), expected_token.as_bytes()))
                .unwrap_or(false);

            if !authorized {
                return HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": "unauthorized",
                    "message": "Valid Bearer token required for /metrics"
                }));
            }
        }
        // No token configured: closed unless the operator opted in
        None if !state.config.public_metrics => {
            return HttpResponse::Forbidden().json(serde_json::json!({
                "error": "forbidden",
                "message": "/metrics is disabled; set METRICS_TOKEN or PIGGYBANK_PUBLIC_METRICS=true"
            }));
        }
        None => {}
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics_output())
}

pub fn configure<F: Facilitator + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::<F>))
        .route("/metrics", web::get().to(metrics::<F>));
}
