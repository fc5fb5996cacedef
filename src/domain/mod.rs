//! Domain types for the auction ledger.
//!
//! This module provides:
//! - Lossless 256-bit amounts with a decimal-string codec
//! - Q96 fixed-point price conversion and FDV
//! - Raw bid/exit events and the derived per-bid view
//! - Chronological ordering of ledger events

pub mod bid;
pub mod event;
pub mod ordering;
pub mod price;
pub mod primitives;
pub mod wei;

pub use bid::{Category, ProcessedBid};
pub use event::{BidEvent, ExitEvent};
pub use ordering::{sort_chronological, EventOrderingKey, LedgerPosition};
pub use price::{calculate_fdv, q96_to_eth_price, Q96};
pub use primitives::{Address, BidId, BlockNumber, BlockRange, TxHash};
pub use wei::{format_ether, parse_u256, wei_to_eth_f64, AmountParseError};

pub use alloy_primitives::U256;
