//! Q96 fixed-point price conversion.
//!
//! A bid price is `(ETH per token) * 2^96`. Conversion keeps full integer
//! precision up to the scaling step and only rounds in the final float divide.

use super::wei::u256_to_f64;
use alloy_primitives::U256;

/// 2^96.
pub const Q96: U256 = U256::from_limbs([0, 1 << 32, 0, 0]);

/// Fixed factor applied before the division by 2^96.
pub const PRICE_SCALE: u64 = 1_000_000_000_000_000_000;

const Q96_BITS: usize = 96;

/// `floor(price_q96 * PRICE_SCALE / 2^96)` without overflowing 256 bits.
///
/// Splits the price into `whole * 2^96 + rem`; both partial products stay far
/// below 2^256 even for `U256::MAX`.
pub fn scale_q96(price_q96: U256) -> U256 {
    let scale = U256::from(PRICE_SCALE);
    let whole = price_q96 >> Q96_BITS;
    let rem = price_q96 & (Q96 - U256::from(1u8));

    whole * scale + ((rem * scale) >> Q96_BITS)
}

/// ETH per token for a Q96 price.
pub fn q96_to_eth_price(price_q96: U256) -> f64 {
    u256_to_f64(scale_q96(price_q96)) / PRICE_SCALE as f64
}

/// Fully-diluted valuation in ETH: ETH per token times total supply.
pub fn calculate_fdv(price_q96: U256, total_supply: u64) -> f64 {
    q96_to_eth_price(price_q96) * total_supply as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPPLY: u64 = 10_350_000_000;

    #[test]
    fn test_q96_constant() {
        assert_eq!(Q96, U256::from(1u8) << 96usize);
    }

    #[test]
    fn test_zero_price() {
        assert_eq!(q96_to_eth_price(U256::ZERO), 0.0);
        assert_eq!(calculate_fdv(U256::ZERO, SUPPLY), 0.0);
    }

    #[test]
    fn test_unit_price() {
        assert_eq!(q96_to_eth_price(Q96), 1.0);
        assert_eq!(calculate_fdv(Q96, SUPPLY), SUPPLY as f64);
    }

    #[test]
    fn test_fractional_price_keeps_precision() {
        // 1/1024 ETH per token
        let price = Q96 >> 10usize;
        assert_eq!(q96_to_eth_price(price), 1.0 / 1024.0);
    }

    #[test]
    fn test_scale_matches_wide_arithmetic_for_small_prices() {
        for price in [1u128, 12345, 1 << 90, (1 << 100) + 7, u128::MAX] {
            let p = U256::from(price);
            let expected = (p * U256::from(PRICE_SCALE)) / Q96;
            assert_eq!(scale_q96(p), expected, "price {}", price);
        }
    }

    #[test]
    fn test_max_price_does_not_overflow() {
        let eth = q96_to_eth_price(U256::MAX);
        assert!(eth.is_finite());
        assert!(eth > 1e48);
        assert!(calculate_fdv(U256::MAX, SUPPLY).is_finite());
    }

    #[test]
    fn test_non_negative_and_monotonic() {
        let mut prices = vec![
            U256::ZERO,
            U256::from(1u8),
            U256::from(2u8),
            Q96 >> 64usize,
            Q96 - U256::from(1u8),
            Q96,
            Q96 + U256::from(1u8),
            Q96 * U256::from(1000u64),
            U256::from(u128::MAX),
            U256::MAX >> 1usize,
            U256::MAX - U256::from(1u8),
            U256::MAX,
        ];
        prices.sort();

        let mut previous = 0.0f64;
        for price in prices {
            let value = q96_to_eth_price(price);
            assert!(value >= 0.0);
            assert!(value >= previous, "not monotonic at {}", price);
            previous = value;
        }
    }
}
