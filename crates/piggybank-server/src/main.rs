use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use x402::HttpFacilitator;

use piggybank_server::{
    config::ServerConfig, db::Database, metrics::register_metrics, routes, state::AppState,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration. Missing required variables fail here, before the
    // server binds — never per-request.
    let config = ServerConfig::from_env().expect("Failed to load configuration");
    let port = config.port;
    let allowed_origins = config.allowed_origins.clone();
    let rate_limit_rpm = config.rate_limit_rpm;

    tracing::info!("Starting piggybank-server on port {}", port);
    tracing::info!("Facilitator URL: {}", config.facilitator_url);
    tracing::info!("Payment asset: {} on {}", config.asset.symbol, config.asset.network);
    tracing::info!(
        "HMAC auth: {}",
        if config.hmac_secret.is_some() {
            "enabled"
        } else {
            "disabled (dev mode)"
        }
    );

    // Initialize database
    let db = Database::new(&config.db_path).expect("Failed to initialize database");
    tracing::info!("Database initialized at: {}", config.db_path);

    // Register Prometheus metrics
    register_metrics();

    // The facilitator is an injected dependency constructed once here, from
    // validated config — it moves funds, so nothing builds one lazily.
    let facilitator = HttpFacilitator::with_client(
        reqwest::Client::new(),
        &config.facilitator_url,
        config.hmac_secret.clone(),
    );

    let state = AppState::new(config, db, facilitator);
    let state_data = web::Data::new(state);

    // Configure rate limiter
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_minute(rate_limit_rpm as u64)
        .finish()
        .expect("Failed to create rate limiter config");

    // Start HTTP server
    HttpServer::new(move || {
        let cors = piggybank_server::cors::build_cors(&allowed_origins);

        App::new()
            .app_data(state_data.clone())
            .app_data(web::JsonConfig::default().limit(64 * 1024)) // 64KB body limit
            .wrap(Logger::default())
            .wrap(cors)
            .wrap(Governor::new(&governor_conf))
            .configure(routes::health::configure::<HttpFacilitator>)
            .configure(routes::recipients::configure::<HttpFacilitator>)
            .configure(routes::tip::configure::<HttpFacilitator>)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
