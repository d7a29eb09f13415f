//! x402 micropayment protocol support for the PiggyBank tip service.
//!
//! Implements the server side of HTTP 402 pay-per-request: building payment
//! requirements for a tip, decoding the `X-PAYMENT` proof header, and talking
//! to an external facilitator that verifies and settles payments.
//!
//! # Three-party model
//!
//! - **Client** — constructs a signed payment payload from a 402 challenge
//! - **Server** (this crate + `piggybank-server`) — issues challenges, gates
//!   fulfillment on settlement
//! - **Facilitator** ([`Facilitator`]) — verifies proofs and submits them
//!   on-chain; entirely external, reached over HTTP via [`HttpFacilitator`]
//!
//! The payment payload itself is opaque here: this crate decodes only the
//! transport envelope (base64 JSON) and forwards the parsed value verbatim.

pub mod amount;
pub mod constants;
pub mod error;
pub mod facilitator;
pub mod header;
pub mod hmac;
pub mod payment;
pub mod requirements;
pub mod response;
pub mod security;

pub use constants::*;
pub use error::X402Error;
pub use facilitator::{Facilitator, HttpFacilitator};
pub use header::{decode_payment, decode_receipt, encode_payment, encode_receipt, PaymentReceipt};
pub use payment::{PaymentPayload, PaymentRequiredBody, PaymentRequirements};
pub use requirements::build_requirements;
pub use response::{SettleResponse, VerifyResponse};
