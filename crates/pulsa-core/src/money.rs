//! Money arithmetic in integer minor units
//!
//! All balance sufficiency checks in the settlement engine go through this
//! module. Amounts are stored as `Decimal`, but comparisons are performed on
//! integer minor-currency units (cents): comparing decimals that went through
//! binary floating point at any boundary admits overdraft on fractional
//! amounts.

use crate::{AppError, AppResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Minor units per major currency unit (cents per rupiah/dollar)
pub const MINOR_UNITS_PER_UNIT: i64 = 100;

/// Convert a decimal amount to integer minor units, truncating sub-cent digits.
pub fn to_minor_units(amount: Decimal) -> AppResult<i64> {
    (amount * Decimal::from(MINOR_UNITS_PER_UNIT))
        .trunc()
        .to_i64()
        .ok_or_else(|| AppError::InvalidAmount(format!("amount out of range: {}", amount)))
}

/// Convert a decimal amount to integer minor units, rounding any sub-cent
/// remainder up.
fn to_minor_units_ceil(amount: Decimal) -> AppResult<i64> {
    (amount * Decimal::from(MINOR_UNITS_PER_UNIT))
        .ceil()
        .to_i64()
        .ok_or_else(|| AppError::InvalidAmount(format!("amount out of range: {}", amount)))
}

/// Check whether `balance` covers `required` using minor-unit comparison.
///
/// The required side rounds up: a balance of 95.00 does not cover a charge
/// of 95.0095, even though both truncate to the same cent count.
pub fn covers(balance: Decimal, required: Decimal) -> AppResult<bool> {
    Ok(to_minor_units(balance)? >= to_minor_units_ceil(required)?)
}

/// Validate that an amount is strictly positive.
pub fn require_positive(amount: Decimal) -> AppResult<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(AppError::InvalidAmount(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(dec!(100.00)).unwrap(), 10000);
        assert_eq!(to_minor_units(dec!(0.01)).unwrap(), 1);
        assert_eq!(to_minor_units(dec!(0)).unwrap(), 0);
        // Sub-cent digits truncate
        assert_eq!(to_minor_units(dec!(1.999)).unwrap(), 199);
    }

    #[test]
    fn test_covers_exact_boundary() {
        assert!(covers(dec!(30000), dec!(30000)).unwrap());
        assert!(!covers(dec!(29999.99), dec!(30000)).unwrap());
    }

    #[test]
    fn test_covers_fractional_amounts() {
        // The case naive float comparison gets wrong: 0.1 + 0.2 style noise
        assert!(covers(dec!(0.30), dec!(0.30)).unwrap());
        assert!(!covers(dec!(0.29), dec!(0.30)).unwrap());
        assert!(covers(dec!(10.505), dec!(10.50)).unwrap());
    }

    #[test]
    fn test_covers_rounds_required_up() {
        // A sub-cent charge remainder must not slide under the balance;
        // 100.01 * 0.95 = 95.0095 needs 95.01 on hand, not 95.00.
        assert!(!covers(dec!(95.00), dec!(100.01) * dec!(0.95)).unwrap());
        assert!(covers(dec!(95.01), dec!(100.01) * dec!(0.95)).unwrap());
        // Exact cent amounts are unaffected
        assert!(covers(dec!(95.00), dec!(95.00)).unwrap());
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive(dec!(1)).is_ok());
        assert!(require_positive(dec!(0)).is_err());
        assert!(require_positive(dec!(-5)).is_err());
    }
}
