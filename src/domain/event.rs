//! Raw auction events as observed on the ledger.

use super::primitives::{Address, BidId, BlockNumber, TxHash};
use super::wei::u256_string;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// One on-chain bid submission. Immutable once observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidEvent {
    pub id: BidId,
    pub owner: Address,
    /// Price as `(ETH per token) * 2^96`.
    #[serde(with = "u256_string")]
    pub price_q96: U256,
    #[serde(with = "u256_string")]
    pub amount_wei: U256,
    pub block_number: BlockNumber,
    pub transaction_hash: TxHash,
    /// Tie-breaker for events within the same block.
    pub log_index: u64,
}

/// A later event reducing a bid's committed amount.
///
/// Several exits may reference the same bid; their refunds accumulate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitEvent {
    pub bid_id: BidId,
    pub owner: Address,
    #[serde(with = "u256_string")]
    pub tokens_filled: U256,
    #[serde(with = "u256_string")]
    pub currency_refunded: U256,
    pub block_number: BlockNumber,
    pub transaction_hash: TxHash,
    pub log_index: u64,
}
