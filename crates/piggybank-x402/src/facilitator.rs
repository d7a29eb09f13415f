//! The verify/settle boundary.
//!
//! All cryptographic and chain-level work lives behind this trait: signature
//! checks, replay/nonce handling, and on-chain submission belong to the
//! facilitator service, never to this codebase. The trait exists so the
//! orchestrator can be tested against a mock.

use std::time::Duration;

use crate::payment::{PaymentPayload, PaymentRequirements};
use crate::response::{SettleResponse, VerifyResponse};
use crate::X402Error;

/// Per-call timeout for facilitator requests. A settle call that hangs past
/// this window surfaces as an error; it is never retried, since the payment
/// may already have been submitted.
const FACILITATOR_TIMEOUT: Duration = Duration::from_secs(30);

/// External payment facilitator: verifies payment proofs and settles them
/// on-chain.
///
/// Both calls are remote and fallible. Neither is safe to retry blindly —
/// in particular, a `settle` that fails without a definite response must be
/// surfaced to the caller, not resubmitted.
pub trait Facilitator: Send + Sync {
    /// Check a payment payload against the requirements without moving funds.
    fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> impl std::future::Future<Output = Result<VerifyResponse, X402Error>> + Send;

    /// Submit a verified payment for on-chain execution.
    fn settle(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> impl std::future::Future<Output = Result<SettleResponse, X402Error>> + Send;
}

/// HTTP client for a remote facilitator exposing `/verify` and `/settle`.
///
/// Request bodies are signed with HMAC-SHA256 when a shared secret is
/// configured (`X-Facilitator-Auth` header).
pub struct HttpFacilitator {
    http: reqwest::Client,
    base_url: String,
    hmac_secret: Option<Vec<u8>>,
}

impl HttpFacilitator {
    pub fn new(base_url: &str, hmac_secret: Option<Vec<u8>>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            hmac_secret,
        }
    }

    /// Reuse an existing client (shared connection pool).
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        hmac_secret: Option<Vec<u8>>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            hmac_secret,
        }
    }

    async fn post(
        &self,
        path: &str,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<reqwest::Response, X402Error> {
        let url = format!("{}{}", self.base_url, path);
        let body = serde_json::json!({
            "paymentPayload": payload,
            "paymentRequirements": requirements,
        });
        let body_bytes = serde_json::to_vec(&body)?;

        let mut request = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .timeout(FACILITATOR_TIMEOUT);

        if let Some(ref secret) = self.hmac_secret {
            let sig = crate::hmac::compute_hmac(secret, &body_bytes);
            request = request.header("X-Facilitator-Auth", sig);
        }

        let resp = request
            .body(body_bytes)
            .send()
            .await
            .map_err(|e| X402Error::Facilitator(format!("request to {path} failed: {e}")))?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(X402Error::Facilitator(
                "facilitator authentication failed".to_string(),
            ));
        }
        if !resp.status().is_success() {
            return Err(X402Error::Facilitator(format!(
                "{path} returned {}",
                resp.status()
            )));
        }

        Ok(resp)
    }
}

impl Facilitator for HttpFacilitator {
    async fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse, X402Error> {
        let resp = self.post("/verify", payload, requirements).await?;
        resp.json::<VerifyResponse>()
            .await
            .map_err(|e| X402Error::Facilitator(format!("verify response parse failed: {e}")))
    }

    async fn settle(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<SettleResponse, X402Error> {
        let resp = self.post("/settle", payload, requirements).await?;
        resp.json::<SettleResponse>()
            .await
            .map_err(|e| X402Error::Facilitator(format!("settle response parse failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let fac = HttpFacilitator::new("https://facilitator.example/", None);
        assert_eq!(fac.base_url, "https://facilitator.example");
    }

    #[tokio::test]
    async fn test_unreachable_facilitator_is_an_error_not_a_rejection() {
        // Port 1 refuses connections; the transport failure must surface as
        // X402Error::Facilitator, never as a parsed verify/settle rejection.
        let fac = HttpFacilitator::new("http://127.0.0.1:1", None);
        let payload = PaymentPayload(serde_json::json!({}));
        let requirements = crate::build_requirements(
            "0x1111111111111111111111111111111111111111",
            "1",
            "http://localhost/api/send-tip",
            "test",
            &crate::AssetConfig::default(),
        )
        .unwrap();

        let err = fac.verify(&payload, &requirements).await.unwrap_err();
        assert!(matches!(err, X402Error::Facilitator(_)));

        let err = fac.settle(&payload, &requirements).await.unwrap_err();
        assert!(matches!(err, X402Error::Facilitator(_)));
    }
}
