use serde::{Deserialize, Serialize};

/// Result of the facilitator's `verify` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

/// Result of the facilitator's `settle` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
    /// Settlement transaction identifier. `None` on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    pub network: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_response_parses_facilitator_wire_format() {
        let resp: VerifyResponse =
            serde_json::from_str(r#"{"isValid":false,"invalidReason":"insufficient_funds"}"#)
                .unwrap();
        assert!(!resp.is_valid);
        assert_eq!(resp.invalid_reason.as_deref(), Some("insufficient_funds"));
        assert!(resp.payer.is_none());
    }

    #[test]
    fn test_settle_response_parses_facilitator_wire_format() {
        let resp: SettleResponse = serde_json::from_str(
            r#"{"success":true,"transaction":"0xabc","network":"base-sepolia","payer":"0x1234567890123456789012345678901234567890"}"#,
        )
        .unwrap();
        assert!(resp.success);
        assert_eq!(resp.transaction.as_deref(), Some("0xabc"));
        assert_eq!(resp.network, "base-sepolia");
    }
}
