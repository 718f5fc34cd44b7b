//! U256 helpers for repay amount calculation.

use alloy::primitives::U256;

/// Basis points in one whole (10000 = 100%)
pub const BPS: u16 = 10_000;

/// Basis points denominator as U256
pub const BPS_DENOMINATOR: U256 = U256::from_limbs([BPS as u64, 0, 0, 0]);

/// Take a basis-point share of `value`, rounding down.
///
/// Returns `floor(value * basis_points / 10000)` without overflowing for any
/// `value`. Shares above 100% are clamped to 100%.
///
/// Example: portion_bps(7, 5000) = 3
#[inline(always)]
pub fn portion_bps(value: U256, basis_points: u16) -> U256 {
    let factor = U256::from(basis_points.min(BPS));
    let whole = value / BPS_DENOMINATOR;
    let rest = value % BPS_DENOMINATOR;
    whole * factor + (rest * factor) / BPS_DENOMINATOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_rounds_down() {
        assert_eq!(portion_bps(U256::from(1000u64), 5000), U256::from(500u64));
        assert_eq!(portion_bps(U256::from(7u64), 5000), U256::from(3u64));
        assert_eq!(portion_bps(U256::from(1u64), 5000), U256::ZERO);
        assert_eq!(portion_bps(U256::ZERO, 5000), U256::ZERO);
    }

    #[test]
    fn test_other_fractions() {
        let value = U256::from(1000u64);
        assert_eq!(portion_bps(value, 100), U256::from(10u64));
        assert_eq!(portion_bps(value, 10_000), value);
        // Clamped to 100%
        assert_eq!(portion_bps(value, u16::MAX), value);
    }

    #[test]
    fn test_no_overflow_at_max() {
        assert_eq!(portion_bps(U256::MAX, 10_000), U256::MAX);
        assert_eq!(portion_bps(U256::MAX, 5000), U256::MAX / U256::from(2u64));
    }

    #[test]
    fn test_matches_integer_half() {
        let debt = U256::from(17_860_923_199_800_825_795u128);
        assert_eq!(portion_bps(debt, 5000), debt / U256::from(2u64));
    }
}
