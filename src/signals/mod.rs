//! Prediction-market signal scanner and its paper-trade journal.

pub mod detector;
pub mod journal;

pub use detector::{analyze_market, estimate_mispricing, scan, Direction, Signal, SignalConfig, Strength};
pub use journal::{Journal, JournalStats, LoggedSignal, SignalStatus, UpdateSummary};

use crate::datasource::GammaError;
use std::path::PathBuf;
use thiserror::Error;

/// Markets requested per scan.
pub const SCAN_MARKET_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("market listing error: {0}")]
    Market(#[from] GammaError),
    #[error("journal io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("journal serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
