//! Inflow velocity over the last day of cached bids.

use crate::cache::CacheRecord;
use crate::domain::wei_to_eth_f64;

/// ~12s blocks.
pub const BLOCKS_PER_HOUR: u64 = 300;
pub const BLOCKS_PER_DAY: u64 = BLOCKS_PER_HOUR * 24;
pub const HOURLY_BUCKETS: usize = 24;
pub const WINDOW_HOURS: usize = 4;
pub const RECENT_RATE_HOURS: usize = 6;
pub const DEFAULT_HOURS_REMAINING: f64 = 22.0;

/// Gross bid inflow bucketed by hour, bucket 0 being the most recent hour.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityReport {
    pub last_block: u64,
    pub total_events: usize,
    /// Bids at or after `last_block - BLOCKS_PER_DAY`.
    pub events_in_window: usize,
    pub hourly_eth: [f64; HOURLY_BUCKETS],
    pub total_eth: f64,
}

impl VelocityReport {
    pub fn from_cache(record: &CacheRecord) -> Self {
        let last_block = record.last_block.as_u64();
        let window_start = last_block.saturating_sub(BLOCKS_PER_DAY);

        let mut hourly_eth = [0.0f64; HOURLY_BUCKETS];
        let mut total_eth = 0.0;
        let mut events_in_window = 0;

        for bid in &record.bid_events {
            let block = bid.block_number.as_u64();
            if block < window_start {
                continue;
            }
            events_in_window += 1;

            let bucket = (last_block.saturating_sub(block) / BLOCKS_PER_HOUR) as usize;
            if bucket < HOURLY_BUCKETS {
                let amount = wei_to_eth_f64(bid.amount_wei);
                hourly_eth[bucket] += amount;
                total_eth += amount;
            }
        }

        Self {
            last_block,
            total_events: record.bid_events.len(),
            events_in_window,
            hourly_eth,
            total_eth,
        }
    }

    /// Totals per 4-hour window, most recent first.
    pub fn windows(&self) -> Vec<f64> {
        self.hourly_eth
            .chunks(WINDOW_HOURS)
            .map(|w| w.iter().sum())
            .collect()
    }

    pub fn average_hourly(&self) -> f64 {
        self.total_eth / HOURLY_BUCKETS as f64
    }

    pub fn recent_total(&self) -> f64 {
        self.hourly_eth[..RECENT_RATE_HOURS].iter().sum()
    }

    pub fn recent_hourly(&self) -> f64 {
        self.recent_total() / RECENT_RATE_HOURS as f64
    }

    /// Projected additional inflow from the 24h average and from the 6h rate.
    pub fn projections(&self, hours_remaining: f64) -> (f64, f64) {
        (
            self.average_hourly() * hours_remaining,
            self.recent_hourly() * hours_remaining,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, BidEvent, BidId, BlockNumber, TxHash, U256};

    const ONE_ETH: u64 = 1_000_000_000_000_000_000;

    fn bid_at(block: u64, eth: u64) -> BidEvent {
        BidEvent {
            id: BidId::new(block.to_string()),
            owner: Address::new("0xowner".to_string()),
            price_q96: U256::ZERO,
            amount_wei: U256::from(eth) * U256::from(ONE_ETH),
            block_number: BlockNumber::new(block),
            transaction_hash: TxHash::new(format!("0x{}", block)),
            log_index: 0,
        }
    }

    fn record(bids: Vec<BidEvent>) -> CacheRecord {
        CacheRecord {
            last_block: BlockNumber::new(100_000),
            bid_events: bids,
            exit_events: Vec::new(),
        }
    }

    #[test]
    fn test_bucketing() {
        let report = VelocityReport::from_cache(&record(vec![
            bid_at(100_000, 1),
            bid_at(99_701, 2),
            bid_at(99_700, 4),
            bid_at(100_000 - 23 * 300, 8),
        ]));

        assert_eq!(report.hourly_eth[0], 3.0);
        assert_eq!(report.hourly_eth[1], 4.0);
        assert_eq!(report.hourly_eth[23], 8.0);
        assert_eq!(report.total_eth, 15.0);
    }

    #[test]
    fn test_window_edges() {
        let report = VelocityReport::from_cache(&record(vec![
            // exactly one day back lands in bucket 24, counted but not summed
            bid_at(100_000 - BLOCKS_PER_DAY, 5),
            bid_at(100_000 - BLOCKS_PER_DAY - 1, 7),
        ]));

        assert_eq!(report.total_events, 2);
        assert_eq!(report.events_in_window, 1);
        assert_eq!(report.total_eth, 0.0);
    }

    #[test]
    fn test_rates_and_projections() {
        let bids = (0..24).map(|h| bid_at(100_000 - h * 300, 2)).collect();
        let report = VelocityReport::from_cache(&record(bids));

        assert_eq!(report.windows(), vec![8.0; 6]);
        assert_eq!(report.average_hourly(), 2.0);
        assert_eq!(report.recent_total(), 12.0);
        assert_eq!(report.recent_hourly(), 2.0);
        assert_eq!(report.projections(DEFAULT_HOURS_REMAINING), (44.0, 44.0));
    }

    #[test]
    fn test_empty_cache() {
        let report = VelocityReport::from_cache(&CacheRecord::default());
        assert_eq!(report.total_eth, 0.0);
        assert_eq!(report.projections(22.0), (0.0, 0.0));
    }
}
