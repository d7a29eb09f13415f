//! PiggyBank: a creator tip service built on the x402 micropayment protocol.
//!
//! Creators register a slug → payout address profile; donors tip them with
//! USDC over an HTTP 402 challenge/response exchange. Payment verification
//! and on-chain settlement are delegated to an external facilitator; this
//! service orchestrates the exchange and keeps the donation ledger.

pub mod config;
pub mod cors;
pub mod db;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod validation;

pub use config::ServerConfig;
pub use db::Database;
pub use error::ApiError;
pub use state::AppState;
