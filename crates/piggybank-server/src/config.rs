use std::env;

use url::Url;
use x402::AssetConfig;

const DEFAULT_PORT: u16 = 4080;
const DEFAULT_DB_PATH: &str = "./piggybank.db";
const DEFAULT_RATE_LIMIT_RPM: u32 = 60;

/// Server configuration, read once at startup. Missing required variables
/// fail here, before the server binds — never per-request.
#[derive(Clone)]
pub struct ServerConfig {
    /// Facilitator base URL for payment verification and settlement.
    pub facilitator_url: String,
    /// HMAC shared secret for facilitator auth (None = dev mode).
    pub hmac_secret: Option<Vec<u8>>,
    /// SQLite database path.
    pub db_path: String,
    pub port: u16,
    /// CORS allowed origins.
    pub allowed_origins: Vec<String>,
    /// Rate limit, requests per minute per IP.
    pub rate_limit_rpm: u32,
    /// Bearer token required for /metrics (None = protected by default).
    pub metrics_token: Option<String>,
    /// Serve /metrics without a token. Explicit opt-in only.
    pub public_metrics: bool,
    /// External base URL used as the payment `resource`; when unset the
    /// request's connection info is used instead.
    pub public_base_url: Option<String>,
    /// Payment asset (USDC on Base Sepolia by default).
    pub asset: AssetConfig,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("facilitator_url", &self.facilitator_url)
            .field(
                "hmac_secret",
                &self.hmac_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("db_path", &self.db_path)
            .field("port", &self.port)
            .field("allowed_origins", &self.allowed_origins)
            .field("rate_limit_rpm", &self.rate_limit_rpm)
            .field(
                "metrics_token",
                &self.metrics_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("public_metrics", &self.public_metrics)
            .field("public_base_url", &self.public_base_url)
            .field("asset", &self.asset)
            .finish()
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Required: facilitator URL
        let facilitator_url = env::var("FACILITATOR_URL")
            .map_err(|_| ConfigError::MissingRequired("FACILITATOR_URL"))?;
        Url::parse(&facilitator_url)
            .map_err(|_| ConfigError::InvalidUrl(facilitator_url.clone()))?;

        let hmac_secret = env::var("FACILITATOR_SHARED_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| s.into_bytes());

        let insecure_no_hmac = env::var("PIGGYBANK_INSECURE_NO_HMAC")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        if let Some(ref secret) = hmac_secret {
            if secret.len() < 32 {
                tracing::warn!(
                    "FACILITATOR_SHARED_SECRET is too short ({} bytes, minimum 32) — \
                     use `openssl rand -hex 32` to generate a secure secret",
                    secret.len()
                );
            }
        } else if insecure_no_hmac {
            tracing::warn!(
                "PIGGYBANK_INSECURE_NO_HMAC=true — facilitator requests will be UNAUTHENTICATED. \
                 DO NOT use this in production!"
            );
        } else {
            tracing::error!(
                "FACILITATOR_SHARED_SECRET is required. \
                 Set it to a secure random value (e.g. `openssl rand -hex 32`). \
                 For local development only, set PIGGYBANK_INSECURE_NO_HMAC=true to skip."
            );
            return Err(ConfigError::MissingRequired("FACILITATOR_SHARED_SECRET"));
        }

        let db_path = env::var("DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let allowed_origins: Vec<String> = env::var("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ]
            });

        // Wildcard CORS on payment endpoints only in explicit dev mode
        if allowed_origins.contains(&"*".to_string()) && !insecure_no_hmac {
            tracing::error!(
                "Wildcard CORS origin '*' is not allowed for payment endpoints in production. \
                 Specify explicit origins in ALLOWED_ORIGINS, or set PIGGYBANK_INSECURE_NO_HMAC=true for dev."
            );
            return Err(ConfigError::InvalidUrl(
                "wildcard CORS origin '*' is not allowed in production".to_string(),
            ));
        }

        let rate_limit_rpm = env::var("RATE_LIMIT_RPM")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_RPM);

        let metrics_token = env::var("METRICS_TOKEN").ok().filter(|s| !s.is_empty());
        let public_metrics = env::var("PIGGYBANK_PUBLIC_METRICS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        if metrics_token.is_none() && !public_metrics {
            tracing::warn!(
                "METRICS_TOKEN not set — /metrics requires PIGGYBANK_PUBLIC_METRICS=true"
            );
        }

        let public_base_url = env::var("PUBLIC_BASE_URL").ok().filter(|s| !s.is_empty());
        if let Some(ref base) = public_base_url {
            Url::parse(base).map_err(|_| ConfigError::InvalidUrl(base.clone()))?;
        }

        Ok(Self {
            facilitator_url,
            hmac_secret,
            db_path,
            port,
            allowed_origins,
            rate_limit_rpm,
            metrics_token,
            public_metrics,
            public_base_url,
            asset: AssetConfig::default(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}
