//! Input validation for recipient registration.

use crate::error::ApiError;

/// Validate slug format: 3-30 characters, lowercase letters, numbers, and
/// hyphens only. Callers lowercase before validating so mixed-case input
/// resolves rather than failing.
pub fn validate_slug(slug: &str) -> Result<(), ApiError> {
    if slug.len() < 3 {
        return Err(ApiError::InvalidSlug(
            "slug must be at least 3 characters".to_string(),
        ));
    }
    if slug.len() > 30 {
        return Err(ApiError::InvalidSlug(
            "slug must be at most 30 characters".to_string(),
        ));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ApiError::InvalidSlug(
            "slug must contain only lowercase letters, numbers, and hyphens".to_string(),
        ));
    }
    Ok(())
}

/// Validate a payout address: `0x` followed by 40 hex digits.
pub fn validate_address(address: &str) -> Result<(), ApiError> {
    let hex = address
        .strip_prefix("0x")
        .ok_or_else(|| ApiError::InvalidAddress("address must start with 0x".to_string()))?;

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ApiError::InvalidAddress(
            "address must be 0x followed by 40 hex digits".to_string(),
        ));
    }
    Ok(())
}

/// Validate an optional display name: at most 50 characters.
pub fn validate_display_name(name: &str) -> Result<(), ApiError> {
    if name.chars().count() > 50 {
        return Err(ApiError::InvalidDisplayName(
            "display name must be at most 50 characters".to_string(),
        ));
    }
    Ok(())
}
