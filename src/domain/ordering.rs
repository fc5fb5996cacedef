//! Stable chronological ordering for ledger events.

use crate::domain::{BidEvent, BlockNumber, ExitEvent};

/// Position of an event on the ledger.
///
/// Ordering: block_number -> log_index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventOrderingKey {
    pub block_number: BlockNumber,
    pub log_index: u64,
}

/// Anything that sits at a ledger position.
pub trait LedgerPosition {
    fn ordering_key(&self) -> EventOrderingKey;
}

impl LedgerPosition for BidEvent {
    fn ordering_key(&self) -> EventOrderingKey {
        EventOrderingKey {
            block_number: self.block_number,
            log_index: self.log_index,
        }
    }
}

impl LedgerPosition for ExitEvent {
    fn ordering_key(&self) -> EventOrderingKey {
        EventOrderingKey {
            block_number: self.block_number,
            log_index: self.log_index,
        }
    }
}

/// Sort events chronologically. Stable for equal keys.
pub fn sort_chronological<T: LedgerPosition>(events: &mut [T]) {
    events.sort_by_key(|e| e.ordering_key());
}
