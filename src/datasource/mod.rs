//! Data source abstraction for reading auction events from the ledger.

use crate::domain::{BidEvent, BlockNumber, BlockRange, ExitEvent};
use async_trait::async_trait;
use std::fmt;

pub mod abi;
pub mod gamma;
pub mod mock;
pub mod rpc;

pub use gamma::{GammaClient, GammaError, GammaMarket, MarketSource};
pub use mock::MockLedgerSource;
pub use rpc::JsonRpcLedgerSource;

/// Events returned for one block range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkEvents {
    pub bid_events: Vec<BidEvent>,
    pub exit_events: Vec<ExitEvent>,
}

impl ChunkEvents {
    pub fn is_empty(&self) -> bool {
        self.bid_events.is_empty() && self.exit_events.is_empty()
    }
}

/// Ledger RPC collaborator.
///
/// Implementations issue exactly one remote request per call and do not retry;
/// the retry policy belongs to the caller.
#[async_trait]
pub trait LedgerSource: Send + Sync + fmt::Debug {
    /// Current chain head.
    async fn head_block(&self) -> Result<BlockNumber, LedgerSourceError>;

    /// Fetch bid and exit events emitted by the auction contract within `range`.
    ///
    /// # Returns
    /// Events ordered by (block_number, log_index)
    async fn fetch_events(&self, range: BlockRange) -> Result<ChunkEvents, LedgerSourceError>;
}

/// Error type for ledger source operations.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 5xx server error)
    HttpError { status: u16, message: String },
    /// JSON-RPC error object returned by the node
    RpcError { code: i64, message: String },
    /// Parsing error (invalid JSON or malformed response)
    ParseError(String),
    /// Rate limit exceeded
    RateLimited,
    /// Other error
    Other(String),
}

impl fmt::Display for LedgerSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            LedgerSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            LedgerSourceError::RpcError { code, message } => {
                write!(f, "RPC error {}: {}", code, message)
            }
            LedgerSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            LedgerSourceError::RateLimited => write!(f, "Rate limited"),
            LedgerSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for LedgerSourceError {}
