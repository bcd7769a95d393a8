//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits are chosen as reasonable UX bounds; the storage layer does
//! not enforce lengths on its own.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, category, customer name on an order
pub const MAX_NAME_LEN: usize = 200;

/// URL slugs
pub const MAX_SLUG_LEN: usize = 100;

/// Notes and descriptions
pub const MAX_NOTE_LEN: usize = 2000;

/// Short identifiers: phone, payment method, coupon code
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Address lines: street, city, state
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_required_text_is_rejected() {
        assert!(validate_required_text("", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("Shoes", "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn overlong_text_is_rejected() {
        let long = "x".repeat(MAX_SLUG_LEN + 1);
        assert!(validate_required_text(&long, "slug", MAX_SLUG_LEN).is_err());
        assert!(validate_optional_text(&Some(long), "notes", MAX_SLUG_LEN).is_err());
        assert!(validate_optional_text(&None, "notes", MAX_SLUG_LEN).is_ok());
    }
}
