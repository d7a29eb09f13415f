use crate::amount::scale_amount;
use crate::payment::{AssetExtra, PaymentRequirements};
use crate::{AssetConfig, X402Error, SCHEME_EXACT};

/// Build the canonical payment requirements for a tip.
///
/// `pay_to` must be the recipient's registered payout address, resolved
/// server-side — it is never taken from the client. `resource` is the URL of
/// the protected action, so a settled proof cannot be replayed against a
/// different resource.
pub fn build_requirements(
    pay_to: &str,
    amount: &str,
    resource: &str,
    description: &str,
    asset: &AssetConfig,
) -> Result<PaymentRequirements, X402Error> {
    let max_amount_required = scale_amount(amount, asset.decimals)?;

    Ok(PaymentRequirements {
        scheme: SCHEME_EXACT.to_string(),
        network: asset.network.clone(),
        max_amount_required,
        resource: resource.to_string(),
        description: description.to_string(),
        mime_type: "application/json".to_string(),
        pay_to: pay_to.to_string(),
        max_timeout_seconds: asset.max_timeout_seconds,
        asset: asset.asset.clone(),
        extra: AssetExtra {
            name: asset.eip712_name.clone(),
            version: asset.eip712_version.clone(),
        },
    })
}
