//! Validation utilities for Pharmacy Manager
//!
//! Numbers arriving from the browser are plain `f64`s. They are checked here
//! before the calculation layer sees them, so negative or fractional stock
//! counts are rejected instead of producing nonsense.

use rust_decimal::Decimal;

use crate::error::InputError;
use crate::expiry::Expiry;

/// Largest integer an `f64` represents exactly
const MAX_EXACT_F64: f64 = 9_007_199_254_740_992.0;

fn parse_whole(value: f64, field: &'static str) -> Result<u64, InputError> {
    if value.is_nan() {
        return Ok(0);
    }
    if !value.is_finite() {
        return Err(InputError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(InputError::Negative { field });
    }
    if value.fract() != 0.0 {
        return Err(InputError::Fractional { field });
    }
    if value > MAX_EXACT_F64 {
        return Err(InputError::OutOfRange { field });
    }
    Ok(value as u64)
}

/// Stock quantity in loose units; NaN counts as an empty quantity
pub fn parse_quantity(value: f64) -> Result<u64, InputError> {
    parse_whole(value, "quantity")
}

/// Units per pack; NaN and zero count as one
pub fn parse_pack(value: f64) -> Result<u32, InputError> {
    let pack = parse_whole(value, "pack")?;
    let pack = u32::try_from(pack).map_err(|_| InputError::OutOfRange { field: "pack" })?;
    Ok(pack.max(1))
}

/// Whole-rupee amount to be written in words
pub fn parse_amount(value: f64) -> Result<u64, InputError> {
    parse_whole(value, "amount")
}

// ============================================================================
// Batch Form Validations
// ============================================================================

/// Batch number is required and at most 50 characters
pub fn validate_batch_number(batch_number: &str) -> Result<(), &'static str> {
    let trimmed = batch_number.trim();
    if trimmed.is_empty() {
        return Err("Batch number is required");
    }
    if trimmed.len() > 50 {
        return Err("Batch number must be at most 50 characters");
    }
    Ok(())
}

/// Expiry must be written as MM/YY
pub fn validate_expiry(expiry: &str) -> Result<(), &'static str> {
    expiry
        .parse::<Expiry>()
        .map(|_| ())
        .map_err(|_| "Expiry must be in MM/YY format")
}

/// HSN codes are 4, 6 or 8 digits
pub fn validate_hsn(hsn: &str) -> Result<(), &'static str> {
    let hsn = hsn.trim();
    if !hsn.chars().all(|c| c.is_ascii_digit()) {
        return Err("HSN code must contain digits only");
    }
    if !matches!(hsn.len(), 4 | 6 | 8) {
        return Err("HSN code must be 4, 6 or 8 digits");
    }
    Ok(())
}

/// GST percentage must not be negative; there is no upper bound
pub fn validate_gst_percent(gst_per: Decimal) -> Result<(), &'static str> {
    if gst_per < Decimal::ZERO {
        return Err("GST percentage cannot be negative");
    }
    Ok(())
}

/// Standard Indian GST slabs
pub const GST_SLABS: &[u32] = &[0, 5, 12, 18, 28];

/// Whether a percentage is one of the standard slabs
pub fn is_standard_gst_slab(gst_per: Decimal) -> bool {
    GST_SLABS.iter().any(|slab| Decimal::from(*slab) == gst_per)
}

/// Monetary amounts cannot be negative
pub fn validate_non_negative_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(135.0), Ok(135));
        assert_eq!(parse_quantity(0.0), Ok(0));
        assert_eq!(parse_quantity(f64::NAN), Ok(0));
        assert_eq!(
            parse_quantity(-1.0),
            Err(InputError::Negative { field: "quantity" })
        );
        assert_eq!(
            parse_quantity(1.5),
            Err(InputError::Fractional { field: "quantity" })
        );
        assert_eq!(
            parse_quantity(f64::INFINITY),
            Err(InputError::NotFinite { field: "quantity" })
        );
        assert!(parse_quantity(1e300).is_err());
    }

    #[test]
    fn test_parse_pack() {
        assert_eq!(parse_pack(10.0), Ok(10));
        assert_eq!(parse_pack(0.0), Ok(1));
        assert_eq!(parse_pack(f64::NAN), Ok(1));
        assert!(parse_pack(2.5).is_err());
        assert!(parse_pack(-10.0).is_err());
        assert!(parse_pack(5e9).is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(123456789.0), Ok(123456789));
        assert!(parse_amount(-5.0).is_err());
    }

    #[test]
    fn test_validate_batch_number() {
        assert!(validate_batch_number("B2024-01").is_ok());
        assert!(validate_batch_number("").is_err());
        assert!(validate_batch_number("   ").is_err());
        assert!(validate_batch_number(&"X".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_expiry() {
        assert!(validate_expiry("12/25").is_ok());
        assert!(validate_expiry("12/2025").is_err());
        assert!(validate_expiry("").is_err());
    }

    #[test]
    fn test_validate_hsn() {
        assert!(validate_hsn("3004").is_ok());
        assert!(validate_hsn("300490").is_ok());
        assert!(validate_hsn("30049099").is_ok());
        assert!(validate_hsn("30A4").is_err());
        assert!(validate_hsn("300").is_err());
        assert!(validate_hsn("30049").is_err());
    }

    #[test]
    fn test_validate_gst_percent() {
        assert!(validate_gst_percent(dec("0")).is_ok());
        assert!(validate_gst_percent(dec("12")).is_ok());
        assert!(validate_gst_percent(dec("-1")).is_err());
        assert!(validate_gst_percent(dec("100.5")).is_ok());
        assert!(validate_gst_percent(dec("150")).is_ok());
    }

    #[test]
    fn test_standard_slabs() {
        assert!(is_standard_gst_slab(dec("18")));
        assert!(is_standard_gst_slab(dec("5.00")));
        assert!(!is_standard_gst_slab(dec("7")));
    }
}
