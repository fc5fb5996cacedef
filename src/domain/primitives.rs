//! Domain primitives: BlockNumber, BlockRange, Address, TxHash, BidId.

use serde::{Deserialize, Serialize};

/// Ledger position (block height).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BlockNumber(pub u64);

impl BlockNumber {
    /// Create a BlockNumber from a raw height.
    pub fn new(height: u64) -> Self {
        BlockNumber(height)
    }

    /// Get the underlying height.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive block range `[from, to]`.
///
/// Always non-empty: construction through [`BlockRange::new`] rejects `from > to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRange {
    pub from: BlockNumber,
    pub to: BlockNumber,
}

impl BlockRange {
    /// Create a range, or `None` when `from > to`.
    pub fn new(from: u64, to: u64) -> Option<Self> {
        (from <= to).then_some(BlockRange {
            from: BlockNumber(from),
            to: BlockNumber(to),
        })
    }

    /// Number of blocks covered (inclusive on both ends).
    pub fn block_count(&self) -> u64 {
        self.to.0 - self.from.0 + 1
    }

    /// Whether a block height falls inside the range.
    pub fn contains(&self, block: BlockNumber) -> bool {
        block >= self.from && block <= self.to
    }
}

impl std::fmt::Display for BlockRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// Account address (0x-prefixed lowercase hex string).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    /// Create an Address from a string.
    pub fn new(addr: String) -> Self {
        Address(addr)
    }

    /// Get the address as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction hash (0x-prefixed hex string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub String);

impl TxHash {
    pub fn new(hash: String) -> Self {
        TxHash(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Bid identifier: a 256-bit integer carried as its decimal string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BidId(pub String);

impl BidId {
    pub fn new(id: String) -> Self {
        BidId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BidId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_range_rejects_inverted_bounds() {
        assert!(BlockRange::new(2501, 2500).is_none());
        assert!(BlockRange::new(2500, 2500).is_some());
    }

    #[test]
    fn test_block_range_count_and_contains() {
        let range = BlockRange::new(1000, 1999).unwrap();
        assert_eq!(range.block_count(), 1000);
        assert!(range.contains(BlockNumber::new(1000)));
        assert!(range.contains(BlockNumber::new(1999)));
        assert!(!range.contains(BlockNumber::new(2000)));
    }

    #[test]
    fn test_block_number_serializes_as_plain_integer() {
        let json = serde_json::to_string(&BlockNumber::new(19_000_000)).unwrap();
        assert_eq!(json, "19000000");
    }

    #[test]
    fn test_block_number_ordering() {
        assert!(BlockNumber::new(1) < BlockNumber::new(2));
    }

    #[test]
    fn test_bid_id_display() {
        let id = BidId::new("123456789012345678901234567890".to_string());
        assert_eq!(id.to_string(), "123456789012345678901234567890");
    }
}
