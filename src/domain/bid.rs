//! Derived per-bid view produced by reconciliation.

use super::primitives::{Address, BidId};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Bid category by implied valuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// FDV strictly above the market threshold (effectively "any price").
    Market,
    /// Everything at or below the threshold.
    Limit,
}

impl Category {
    /// Classify an FDV against the market threshold. Ties are Limit.
    pub fn classify(fdv_eth: f64, market_threshold_fdv_eth: f64) -> Self {
        if fdv_eth > market_threshold_fdv_eth {
            Category::Market
        } else {
            Category::Limit
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Market => "Market",
            Category::Limit => "Limit",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Net holding of one bid after its exits are applied.
///
/// Regenerated wholesale on every reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedBid {
    pub id: BidId,
    pub owner: Address,
    pub price_q96: U256,
    pub amount_wei: U256,
    pub refunded_wei: U256,
    /// `amount_wei - refunded_wei`, always > 0 for retained bids.
    pub net_amount_wei: U256,
    pub fdv_eth: f64,
    pub category: Category,
}
