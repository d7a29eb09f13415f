/// x402 protocol version carried in challenge bodies.
pub const X402_VERSION: u32 = 1;

/// The only payment scheme this service accepts.
pub const SCHEME_EXACT: &str = "exact";

/// x402 network identifier for Base Sepolia.
pub const BASE_SEPOLIA_NETWORK: &str = "base-sepolia";

/// Base Sepolia chain id.
pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84532;

/// USDC contract on Base Sepolia, lower-cased.
pub const USDC_ADDRESS: &str = "0x036cbd53842c5426634e7929541ec2318f3dcf7e";

pub const USDC_SYMBOL: &str = "USDC";

/// USDC has 6 decimal places.
pub const USDC_DECIMALS: u32 = 6;

/// Validity window communicated to the facilitator for a payment proof.
pub const MAX_TIMEOUT_SECONDS: u64 = 60;

/// Runtime asset configuration. Decouples requirement construction from
/// compile-time constants so other networks/tokens can be plugged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetConfig {
    pub network: String,
    pub chain_id: u64,
    /// Token contract address, lower-cased hex.
    pub asset: String,
    pub symbol: String,
    pub decimals: u32,
    pub max_timeout_seconds: u64,
    /// EIP-712 domain name the facilitator expects for this token.
    pub eip712_name: String,
    /// EIP-712 domain version for this token.
    pub eip712_version: String,
}

impl Default for AssetConfig {
    /// Defaults to USDC on Base Sepolia. The Base Sepolia USDC deployment is
    /// FiatTokenV2_2, which signs under domain version "2".
    fn default() -> Self {
        Self {
            network: BASE_SEPOLIA_NETWORK.to_string(),
            chain_id: BASE_SEPOLIA_CHAIN_ID,
            asset: USDC_ADDRESS.to_string(),
            symbol: USDC_SYMBOL.to_string(),
            decimals: USDC_DECIMALS,
            max_timeout_seconds: MAX_TIMEOUT_SECONDS,
            eip712_name: "USDC".to_string(),
            eip712_version: "2".to_string(),
        }
    }
}
