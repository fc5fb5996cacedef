//! Lossless 256-bit amounts and their decimal-string codec.
//!
//! Amounts and prices routinely exceed the 2^53 range a JSON number can carry
//! without loss, so every persistence and export boundary goes through
//! [`parse_u256`] / `U256::to_string` instead of a numeric encoding.

use alloy_primitives::U256;
use thiserror::Error;

/// Smallest-denomination units per whole ETH.
pub const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

const ETHER_DECIMALS: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    #[error("empty amount string")]
    Empty,
    #[error("invalid decimal amount {0:?}")]
    Invalid(String),
}

/// Parse a base-10 string into a U256.
///
/// Rejects empty input, signs, and hex notation.
pub fn parse_u256(s: &str) -> Result<U256, AmountParseError> {
    if s.is_empty() {
        return Err(AmountParseError::Empty);
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountParseError::Invalid(s.to_string()));
    }
    U256::from_str_radix(s, 10).map_err(|_| AmountParseError::Invalid(s.to_string()))
}

/// Format a wei amount as ETH with all significant fractional digits.
///
/// Always keeps at least one fractional digit (`1000000000000000000` -> `"1.0"`).
pub fn format_ether(wei: U256) -> String {
    let divisor = U256::from(WEI_PER_ETHER);
    let whole = wei / divisor;
    let fraction = wei % divisor;

    let mut fraction_digits = format!("{:0>width$}", fraction.to_string(), width = ETHER_DECIMALS);
    while fraction_digits.len() > 1 && fraction_digits.ends_with('0') {
        fraction_digits.pop();
    }

    format!("{}.{}", whole, fraction_digits)
}

/// Convert a wei amount to a floating ETH value (lossy, for display and shares).
pub fn wei_to_eth_f64(wei: U256) -> f64 {
    // format_ether always yields a well-formed decimal literal
    format_ether(wei).parse().unwrap_or_default()
}

/// Convert a U256 to the nearest f64 via its exact decimal expansion.
pub fn u256_to_f64(value: U256) -> f64 {
    value.to_string().parse().unwrap_or(f64::INFINITY)
}

/// Serde adapter storing a U256 as a decimal string.
pub mod u256_string {
    use super::parse_u256;
    use alloy_primitives::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_u256(&s).map_err(de::Error::custom)
    }
}
