//! Lossless decimal numeric type backed by rust_decimal.
//!
//! Provides canonical parsing from strings and formatting without exponent notation.

use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lossless decimal numeric type for money amounts.
///
/// Backed by rust_decimal to avoid floating-point drift.
/// Serializes to JSON number (not string) by default.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    /// Parse a Decimal from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Decimal)
    }

    /// Format the Decimal as a canonical string (no exponent notation).
    pub fn to_canonical_string(&self) -> String {
        let normalized = self.0.normalize();
        format!("{}", normalized)
    }

    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is > 0.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the value is < 0.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Checked division; `None` when dividing by zero or on overflow.
    pub fn checked_div(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_div(rhs.0).map(Decimal)
    }

    /// Checked multiplication; `None` on overflow.
    pub fn checked_mul(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_mul(rhs.0).map(Decimal)
    }

    /// Checked addition; `None` on overflow.
    pub fn checked_add(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_add(rhs.0).map(Decimal)
    }

    /// Checked subtraction; `None` on overflow.
    pub fn checked_sub(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_sub(rhs.0).map(Decimal)
    }

    /// Addition clamped to the representable range.
    pub fn saturating_add(&self, rhs: Decimal) -> Decimal {
        Decimal(self.0.saturating_add(rhs.0))
    }

    /// Multiplication clamped to the representable range.
    pub fn saturating_mul(&self, rhs: Decimal) -> Decimal {
        Decimal(self.0.saturating_mul(rhs.0))
    }

    /// Largest representable value.
    pub fn max_value() -> Self {
        Decimal(RustDecimal::MAX)
    }

    /// The default resale markup factor (1.2, i.e. +20%).
    pub fn markup_factor() -> Self {
        Decimal(RustDecimal::new(12, 1))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<u32> for Decimal {
    fn from(value: u32) -> Self {
        Decimal(RustDecimal::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_canonical_strips_trailing_zeros() {
        let decimal = Decimal::from_str_canonical("6.000").unwrap();
        assert_eq!(decimal.to_canonical_string(), "6");
        assert!(!decimal.to_canonical_string().contains('e'));
    }

    #[test]
    fn test_decimal_arithmetic() {
        let a = Decimal::from_str_canonical("10.5").unwrap();
        let b = Decimal::from_str_canonical("2.5").unwrap();

        assert_eq!(a.checked_add(b).unwrap().to_canonical_string(), "13");
        assert_eq!(a.checked_sub(b).unwrap().to_canonical_string(), "8");
        assert_eq!(a.checked_mul(b).unwrap().to_canonical_string(), "26.25");
    }

    #[test]
    fn test_decimal_checked_div_by_zero() {
        let a = Decimal::from(90u32);
        assert_eq!(a.checked_div(Decimal::zero()), None);
        assert_eq!(a.checked_div(Decimal::from(15u32)), Some(Decimal::from(6u32)));
    }

    #[test]
    fn test_decimal_json_serialization() {
        let decimal = Decimal::from_str_canonical("123.456").unwrap();
        let json = serde_json::to_value(decimal).unwrap();
        // Should serialize as a JSON number, not a string
        assert!(json.is_number());
        assert_eq!(json.to_string(), "123.456");
    }

    #[test]
    fn test_decimal_json_deserialization_from_number() {
        let decimal: Decimal = serde_json::from_str("8.25").unwrap();
        assert_eq!(decimal, Decimal::from_str_canonical("8.25").unwrap());
    }

    #[test]
    fn test_decimal_sign_predicates() {
        assert!(Decimal::from(1u32).is_positive());
        assert!(!Decimal::zero().is_positive());
        assert!(!Decimal::zero().is_negative());
        assert!(Decimal::from_str_canonical("-1").unwrap().is_negative());
    }

    #[test]
    fn test_decimal_checked_ops_report_overflow() {
        let max = Decimal::max_value();
        let one = Decimal::from(1u32);
        assert_eq!(max.checked_add(one), None);
        assert_eq!(max.checked_mul(Decimal::from(2u32)), None);
        assert_eq!(
            Decimal::zero().checked_sub(max).and_then(|m| m.checked_sub(one)),
            None
        );
        assert_eq!(Decimal::from(5u32).checked_sub(one), Some(Decimal::from(4u32)));
    }

    #[test]
    fn test_decimal_saturating_ops_clamp() {
        let max = Decimal::max_value();
        assert_eq!(max.saturating_add(max), max);
        assert_eq!(max.saturating_mul(Decimal::markup_factor()), max);
        assert_eq!(
            Decimal::from(2u32).saturating_add(Decimal::from(3u32)),
            Decimal::from(5u32)
        );
    }

    #[test]
    fn test_markup_factor() {
        let price = Decimal::from(10u32)
            .checked_mul(Decimal::markup_factor())
            .unwrap();
        assert_eq!(price, Decimal::from(12u32));
    }
}
