//! Paper-trade journal for logged signals.

use super::detector::{Direction, Signal};
use super::SignalError;
use crate::atomic_file::replace_file;
use crate::datasource::MarketSource;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Notional per paper trade, in dollars.
pub const POSITION_SIZE: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStatus {
    Pending,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedSignal {
    #[serde(flatten)]
    pub signal: Signal,
    pub logged_at: String,
    pub entry_price: Decimal,
    pub status: SignalStatus,
    #[serde(default)]
    pub exit_price: Option<Decimal>,
    #[serde(default)]
    pub pnl: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Decimal>,
}

impl LoggedSignal {
    fn resolve(&mut self, exit_price: Decimal) {
        let pnl = match self.signal.direction {
            Direction::Buy => (exit_price - self.entry_price) * POSITION_SIZE,
            Direction::Sell => (self.entry_price - exit_price) * POSITION_SIZE,
        };
        self.exit_price = Some(exit_price);
        self.pnl = Some(pnl);
        self.status = SignalStatus::Resolved;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub resolved: usize,
    pub refreshed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalStats {
    pub total: usize,
    pub resolved: usize,
    pub wins: usize,
    /// Percent of resolved trades with positive PnL.
    pub win_rate: Option<f64>,
    pub total_pnl: Decimal,
}

/// File-backed journal, newest entry first.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
    entries: Vec<LoggedSignal>,
}

impl Journal {
    /// Open the journal at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ignoring unreadable journal {}: {}", path.display(), e);
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!("Ignoring unreadable journal {}: {}", path.display(), e);
                Vec::new()
            }
        };
        debug!("Opened journal with {} entries", entries.len());
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[LoggedSignal] {
        &self.entries
    }

    pub fn contains(&self, market_id: &str) -> bool {
        self.entries.iter().any(|e| e.signal.market_id == market_id)
    }

    /// Journal a signal. Returns false if its market is already journaled.
    pub fn log(&mut self, signal: Signal, now: DateTime<Utc>) -> Result<bool, SignalError> {
        if self.contains(&signal.market_id) {
            return Ok(false);
        }

        let entry_price = signal.price;
        self.entries.insert(
            0,
            LoggedSignal {
                signal,
                logged_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
                entry_price,
                status: SignalStatus::Pending,
                exit_price: None,
                pnl: None,
                current_price: None,
            },
        );
        self.save()?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), SignalError> {
        self.entries.clear();
        self.save()
    }

    /// Refresh every pending entry from the market listing.
    ///
    /// Settled markets resolve at their final YES price (0 when absent).
    /// Per-entry fetch failures are logged and skipped.
    pub async fn update_outcomes(
        &mut self,
        source: &dyn MarketSource,
    ) -> Result<UpdateSummary, SignalError> {
        let mut summary = UpdateSummary::default();

        for entry in self
            .entries
            .iter_mut()
            .filter(|e| e.status == SignalStatus::Pending)
        {
            let market = match source.fetch_market(&entry.signal.market_id).await {
                Ok(market) => market,
                Err(e) => {
                    warn!(market = %entry.signal.market_id, error = %e, "Failed to update signal");
                    summary.failed += 1;
                    continue;
                }
            };

            if market.is_settled() {
                entry.resolve(market.yes_price().unwrap_or(Decimal::ZERO));
                info!(
                    market = %entry.signal.market_id,
                    "Resolved {} trade, pnl {}",
                    entry.signal.direction,
                    entry.pnl.unwrap_or_default()
                );
                summary.resolved += 1;
            } else {
                entry.current_price = Some(market.yes_price().unwrap_or(entry.entry_price));
                summary.refreshed += 1;
            }
        }

        if summary.resolved > 0 || summary.refreshed > 0 {
            self.save()?;
        }
        Ok(summary)
    }

    pub fn stats(&self) -> JournalStats {
        let resolved: Vec<&LoggedSignal> = self
            .entries
            .iter()
            .filter(|e| e.status == SignalStatus::Resolved)
            .collect();
        let wins = resolved
            .iter()
            .filter(|e| e.pnl.is_some_and(|p| p > Decimal::ZERO))
            .count();
        let total_pnl = resolved.iter().filter_map(|e| e.pnl).sum();

        JournalStats {
            total: self.entries.len(),
            resolved: resolved.len(),
            wins,
            win_rate: (!resolved.is_empty())
                .then(|| wins as f64 / resolved.len() as f64 * 100.0),
            total_pnl,
        }
    }

    fn save(&self) -> Result<(), SignalError> {
        let json = serde_json::to_vec_pretty(&self.entries)?;
        replace_file(&self.path, &json).map_err(|source| SignalError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
