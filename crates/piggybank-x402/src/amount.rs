use crate::X402Error;

/// Scale a human-readable decimal amount (e.g. "1.50") to the asset's
/// smallest unit, rendered as an integer string.
///
/// Integer-only parsing: split on the decimal point and compute from parts.
/// No f64 anywhere in the pipeline, so no floating-point remainder can leak
/// into the transport value. Fractional digits beyond `decimals` are
/// truncated (round down).
pub fn scale_amount(amount: &str, decimals: u32) -> Result<String, X402Error> {
    let amount = amount.trim();

    if amount.is_empty() {
        return Err(X402Error::InvalidAmount("empty amount".to_string()));
    }
    if !amount.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(X402Error::InvalidAmount(format!(
            "'{amount}' is not a decimal number"
        )));
    }

    let units = match amount.split_once('.') {
        Some((integer_part, fractional_part)) => {
            let integer: u64 = if integer_part.is_empty() {
                0
            } else {
                integer_part.parse::<u64>().map_err(|e| {
                    X402Error::InvalidAmount(format!("'{amount}': integer part: {e}"))
                })?
            };

            // Truncate the fractional part to at most `decimals` digits
            let frac_str = if fractional_part.len() > decimals as usize {
                &fractional_part[..decimals as usize]
            } else {
                fractional_part
            };

            let fractional: u64 = if frac_str.is_empty() {
                0
            } else {
                frac_str.parse::<u64>().map_err(|e| {
                    X402Error::InvalidAmount(format!("'{amount}': fractional part: {e}"))
                })?
            };

            // Scale the fractional part up if it had fewer digits than `decimals`
            let scale = 10u64.pow(decimals - frac_str.len() as u32);

            let whole = integer
                .checked_mul(10u64.pow(decimals))
                .ok_or_else(|| X402Error::InvalidAmount(format!("'{amount}': overflow")))?;
            let frac = fractional
                .checked_mul(scale)
                .ok_or_else(|| X402Error::InvalidAmount(format!("'{amount}': overflow")))?;
            whole
                .checked_add(frac)
                .ok_or_else(|| X402Error::InvalidAmount(format!("'{amount}': overflow")))?
        }
        None => {
            let integer: u64 = amount
                .parse::<u64>()
                .map_err(|e| X402Error::InvalidAmount(format!("'{amount}': {e}")))?;
            integer
                .checked_mul(10u64.pow(decimals))
                .ok_or_else(|| X402Error::InvalidAmount(format!("'{amount}': overflow")))?
        }
    };

    // Zero units would produce a challenge no payment can satisfy
    if units == 0 {
        return Err(X402Error::InvalidAmount(format!(
            "'{amount}' is below the smallest transferable unit"
        )));
    }

    Ok(units.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::USDC_DECIMALS;

    #[test]
    fn test_whole_amount() {
        assert_eq!(scale_amount("1", USDC_DECIMALS).unwrap(), "1000000");
        assert_eq!(scale_amount("25", USDC_DECIMALS).unwrap(), "25000000");
    }

    #[test]
    fn test_fractional_amount() {
        assert_eq!(scale_amount("0.5", USDC_DECIMALS).unwrap(), "500000");
        assert_eq!(scale_amount("10.50", USDC_DECIMALS).unwrap(), "10500000");
        assert_eq!(scale_amount("0.000001", USDC_DECIMALS).unwrap(), "1");
    }

    #[test]
    fn test_leading_dot() {
        assert_eq!(scale_amount(".5", USDC_DECIMALS).unwrap(), "500000");
    }

    #[test]
    fn test_trailing_dot() {
        assert_eq!(scale_amount("3.", USDC_DECIMALS).unwrap(), "3000000");
    }

    #[test]
    fn test_truncates_beyond_decimals() {
        // 7 fractional digits -- truncated to 6, round down
        assert_eq!(scale_amount("0.0000019", USDC_DECIMALS).unwrap(), "1");
        assert_eq!(scale_amount("1.9999999", USDC_DECIMALS).unwrap(), "1999999");
    }

    #[test]
    fn test_zero_rejected() {
        assert!(scale_amount("0", USDC_DECIMALS).is_err());
        assert!(scale_amount("0.0", USDC_DECIMALS).is_err());
        // Positive but below one smallest unit rounds down to zero
        assert!(scale_amount("0.0000001", USDC_DECIMALS).is_err());
    }

    #[test]
    fn test_non_numeric_rejected() {
        assert!(scale_amount("", USDC_DECIMALS).is_err());
        assert!(scale_amount("abc", USDC_DECIMALS).is_err());
        assert!(scale_amount("-5", USDC_DECIMALS).is_err());
        assert!(scale_amount("1e6", USDC_DECIMALS).is_err());
        assert!(scale_amount("1.2.3", USDC_DECIMALS).is_err());
        assert!(scale_amount("$1", USDC_DECIMALS).is_err());
    }

    #[test]
    fn test_overflow_rejected() {
        assert!(scale_amount("99999999999999999999", USDC_DECIMALS).is_err());
    }
}
