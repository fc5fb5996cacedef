//! Mock ledger source for testing without network calls.

use super::{ChunkEvents, LedgerSource, LedgerSourceError};
use crate::domain::{sort_chronological, BidEvent, BlockNumber, BlockRange, ExitEvent};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Mock ledger that serves predefined events and can fail on demand.
#[derive(Debug, Default)]
pub struct MockLedgerSource {
    head: Option<BlockNumber>,
    bids: Vec<BidEvent>,
    exits: Vec<ExitEvent>,
    /// Remaining scripted failures per requested range.
    failures: Mutex<HashMap<BlockRange, u32>>,
    requests: Mutex<Vec<BlockRange>>,
}

impl MockLedgerSource {
    /// Create a mock with no head (unreachable) and no events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chain head returned by `head_block`.
    pub fn with_head(mut self, head: u64) -> Self {
        self.head = Some(BlockNumber::new(head));
        self
    }

    /// Add a bid event.
    pub fn with_bid(mut self, bid: BidEvent) -> Self {
        self.bids.push(bid);
        self
    }

    /// Add multiple bid events.
    pub fn with_bids(mut self, bids: Vec<BidEvent>) -> Self {
        self.bids.extend(bids);
        self
    }

    /// Add an exit event.
    pub fn with_exit(mut self, exit: ExitEvent) -> Self {
        self.exits.push(exit);
        self
    }

    /// Fail the next `times` requests for exactly this range.
    pub fn failing(self, range: BlockRange, times: u32) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(range, times);
        }
        self
    }

    /// Every range passed to `fetch_events`, in call order.
    pub fn requests(&self) -> Vec<BlockRange> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LedgerSource for MockLedgerSource {
    async fn head_block(&self) -> Result<BlockNumber, LedgerSourceError> {
        self.head
            .ok_or_else(|| LedgerSourceError::NetworkError("mock ledger unreachable".to_string()))
    }

    async fn fetch_events(&self, range: BlockRange) -> Result<ChunkEvents, LedgerSourceError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(range);
        }

        if let Ok(mut failures) = self.failures.lock() {
            if let Some(remaining) = failures.get_mut(&range) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(LedgerSourceError::HttpError {
                        status: 503,
                        message: "mock failure".to_string(),
                    });
                }
            }
        }

        let mut events = ChunkEvents {
            bid_events: self
                .bids
                .iter()
                .filter(|b| range.contains(b.block_number))
                .cloned()
                .collect(),
            exit_events: self
                .exits
                .iter()
                .filter(|e| range.contains(e.block_number))
                .cloned()
                .collect(),
        };
        sort_chronological(&mut events.bid_events);
        sort_chronological(&mut events.exit_events);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, BidId, TxHash};
    use alloy_primitives::U256;

    fn make_bid(id: &str, block: u64) -> BidEvent {
        BidEvent {
            id: BidId::new(id.to_string()),
            owner: Address::new("0x123".to_string()),
            price_q96: U256::from(1u8),
            amount_wei: U256::from(100u8),
            block_number: BlockNumber::new(block),
            transaction_hash: TxHash::new(format!("0x{}", id)),
            log_index: 0,
        }
    }

    #[tokio::test]
    async fn test_mock_fetch_filters_by_range() {
        let mock = MockLedgerSource::new()
            .with_bid(make_bid("1", 100))
            .with_bid(make_bid("2", 300));

        let events = mock
            .fetch_events(BlockRange::new(0, 200).unwrap())
            .await
            .unwrap();
        assert_eq!(events.bid_events.len(), 1);
        assert_eq!(events.bid_events[0].id.as_str(), "1");
    }

    #[tokio::test]
    async fn test_mock_scripted_failures_then_success() {
        let range = BlockRange::new(0, 10).unwrap();
        let mock = MockLedgerSource::new().failing(range, 1);

        assert!(mock.fetch_events(range).await.is_err());
        assert!(mock.fetch_events(range).await.is_ok());
        assert_eq!(mock.requests(), vec![range, range]);
    }

    #[tokio::test]
    async fn test_mock_head_unreachable_by_default() {
        let mock = MockLedgerSource::new();
        assert!(mock.head_block().await.is_err());

        let mock = MockLedgerSource::new().with_head(2500);
        assert_eq!(mock.head_block().await.unwrap(), BlockNumber::new(2500));
    }
}
