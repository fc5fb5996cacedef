//! Bid/exit reconciliation into net per-bid holdings.

use crate::domain::{
    calculate_fdv, wei_to_eth_f64, BidEvent, BidId, Category, ExitEvent, ProcessedBid, U256,
};
use std::collections::HashMap;
use tracing::debug;

/// Classification parameters for a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcileParams {
    pub market_threshold_fdv_eth: f64,
    pub total_supply: u64,
}

/// Aggregates in ETH, as used by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateStats {
    pub total_eth: f64,
    pub market_eth: f64,
    pub limit_eth: f64,
    /// Percent of total; 0 when nothing is committed.
    pub market_share: f64,
    pub limit_share: f64,
}

/// Output of one reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Retained bids in ledger order.
    pub bids: Vec<ProcessedBid>,
    pub market_sum: U256,
    pub limit_sum: U256,
}

impl Reconciliation {
    pub fn net_total(&self) -> U256 {
        self.market_sum.saturating_add(self.limit_sum)
    }

    pub fn stats(&self) -> AggregateStats {
        let total_eth = wei_to_eth_f64(self.net_total());
        let market_eth = wei_to_eth_f64(self.market_sum);
        let limit_eth = wei_to_eth_f64(self.limit_sum);

        let (market_share, limit_share) = if total_eth > 0.0 {
            (market_eth / total_eth * 100.0, limit_eth / total_eth * 100.0)
        } else {
            (0.0, 0.0)
        };

        AggregateStats {
            total_eth,
            market_eth,
            limit_eth,
            market_share,
            limit_share,
        }
    }

    /// The `limit` most recent retained bids, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&ProcessedBid> {
        self.bids.iter().rev().take(limit).collect()
    }
}

/// Sum of `currency_refunded` per bid id. Order-independent.
pub fn refund_totals(exits: &[ExitEvent]) -> HashMap<&BidId, U256> {
    let mut totals: HashMap<&BidId, U256> = HashMap::new();
    for exit in exits {
        let entry = totals.entry(&exit.bid_id).or_insert(U256::ZERO);
        *entry = entry.saturating_add(exit.currency_refunded);
    }
    totals
}

/// Stateless reconciliation engine. Every pass regenerates all derived records.
pub struct Reconciler {
    params: ReconcileParams,
}

impl Reconciler {
    pub fn new(params: ReconcileParams) -> Self {
        Self { params }
    }

    pub fn reconcile(&self, bids: &[BidEvent], exits: &[ExitEvent]) -> Reconciliation {
        let refunds = refund_totals(exits);

        let mut processed = Vec::with_capacity(bids.len());
        let mut market_sum = U256::ZERO;
        let mut limit_sum = U256::ZERO;
        let mut withdrawn = 0usize;

        for bid in bids {
            let refunded_wei = refunds.get(&bid.id).copied().unwrap_or(U256::ZERO);

            // Over-refunded bids are treated as fully withdrawn.
            let net_amount_wei = match bid.amount_wei.checked_sub(refunded_wei) {
                Some(net) if !net.is_zero() => net,
                _ => {
                    withdrawn += 1;
                    continue;
                }
            };

            let fdv_eth = calculate_fdv(bid.price_q96, self.params.total_supply);
            let category = Category::classify(fdv_eth, self.params.market_threshold_fdv_eth);

            match category {
                Category::Market => market_sum = market_sum.saturating_add(net_amount_wei),
                Category::Limit => limit_sum = limit_sum.saturating_add(net_amount_wei),
            }

            processed.push(ProcessedBid {
                id: bid.id.clone(),
                owner: bid.owner.clone(),
                price_q96: bid.price_q96,
                amount_wei: bid.amount_wei,
                refunded_wei,
                net_amount_wei,
                fdv_eth,
                category,
            });
        }

        debug!(
            "Reconciled {} bids ({} withdrawn) against {} exits",
            processed.len(),
            withdrawn,
            exits.len()
        );

        Reconciliation {
            bids: processed,
            market_sum,
            limit_sum,
        }
    }
}
