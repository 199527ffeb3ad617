//! Exact conversion between on-chain base units and display decimals.
//!
//! Balances arrive as integers in the token's base unit (wei for ETH,
//! 10^-6 USDC, …) and must convert to a human-readable decimal without any
//! binary floating point: a 6-decimal stablecoin and an 18-decimal native
//! asset both have to round-trip exactly, including for the "> 0" holding
//! filter.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

/// A base-unit value that cannot be represented as a `Decimal`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    #[error("balance {value} at {decimals} decimals exceeds the representable range")]
    Overflow { value: u128, decimals: u32 },

    /// `Decimal` supports at most 28 fractional digits.
    #[error("unsupported token precision: {0} decimals")]
    UnsupportedPrecision(u32),
}

/// Convert an integer base-unit balance to a display decimal.
///
/// The conversion is exact: the result carries `decimals` fractional digits
/// and [`to_base_units`] recovers the original integer.
pub fn from_base_units(base_units: u128, decimals: u32) -> Result<Decimal, UnitsError> {
    if decimals > 28 {
        return Err(UnitsError::UnsupportedPrecision(decimals));
    }
    let value = i128::try_from(base_units).map_err(|_| UnitsError::Overflow {
        value: base_units,
        decimals,
    })?;
    Decimal::try_from_i128_with_scale(value, decimals).map_err(|_| UnitsError::Overflow {
        value: base_units,
        decimals,
    })
}

/// Convert a display decimal back to integer base units.
///
/// Returns `None` if the amount has more precision than `decimals` allows
/// or does not fit in a `u128`.
pub fn to_base_units(amount: Decimal, decimals: u32) -> Option<u128> {
    let factor = Decimal::from(10u128.checked_pow(decimals)?);
    let scaled = amount.checked_mul(factor)?;
    if scaled.fract() != Decimal::ZERO {
        return None;
    }
    scaled.to_u128()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn wei_converts_to_ether_exactly() {
        let one_and_a_half_eth = 1_500_000_000_000_000_000u128;
        let amount = from_base_units(one_and_a_half_eth, 18).unwrap();
        assert_eq!(amount.to_string(), "1.500000000000000000");
        assert_eq!(amount, Decimal::new(15, 1));
    }

    #[test]
    fn six_decimal_stablecoin_converts_exactly() {
        let amount = from_base_units(250_000_000, 6).unwrap();
        assert_eq!(amount, Decimal::new(250, 0));
    }

    #[test]
    fn round_trip_recovers_base_units() {
        let cases: [(u128, u32); 7] = [
            (0, 18),
            (1, 18),
            (1, 6),
            (1_500_000_000_000_000_000, 18),
            (250_000_000, 6),
            (123_456_789_012_345_678_901_234_567, 18),
            (79_228_162_514_264_337_593_543_950_335, 18),
        ];
        for (base_units, decimals) in cases {
            let amount = from_base_units(base_units, decimals).unwrap();
            assert_eq!(
                to_base_units(amount, decimals),
                Some(base_units),
                "base_units {base_units} decimals {decimals}"
            );
        }
    }

    #[test]
    fn smallest_unit_is_strictly_positive() {
        assert!(from_base_units(1, 18).unwrap() > Decimal::ZERO);
        assert_eq!(from_base_units(0, 18).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn overflow_is_an_error_not_a_rounding() {
        assert!(matches!(
            from_base_units(u128::MAX, 18),
            Err(UnitsError::Overflow { .. })
        ));
        // One above the 96-bit Decimal mantissa.
        assert!(matches!(
            from_base_units(79_228_162_514_264_337_593_543_950_336, 18),
            Err(UnitsError::Overflow { .. })
        ));
    }

    #[test]
    fn precision_beyond_decimal_range_is_rejected() {
        assert_eq!(
            from_base_units(1, 29),
            Err(UnitsError::UnsupportedPrecision(29))
        );
    }
}
