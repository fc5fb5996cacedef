//! Snapshot exporter: the dashboard summary and the detailed ledger CSV.
//!
//! Both outputs are replaced whole on every run.

pub mod format;

use crate::atomic_file::replace_file;
use crate::domain::{format_ether, wei_to_eth_f64, Category};
use crate::engine::Reconciliation;
use chrono::{DateTime, SecondsFormat, Utc};
use format::{format_fixed, format_grouped, format_plain};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const LEDGER_CSV_HEADER: [&str; 4] = ["Current", "FDV_ETH", "Amount_ETH", "Category"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("snapshot {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Formatted aggregates, exactly as the page shows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStats {
    pub total_eth: String,
    pub market_eth: String,
    pub limit_eth: String,
    pub market_share: String,
    pub limit_share: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentBid {
    /// Net ETH, two decimals.
    pub amount: String,
    pub category: Category,
    pub id: String,
}

/// Dashboard-consumable summary of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// ISO-8601 UTC with milliseconds.
    pub last_updated: String,
    pub stats: SnapshotStats,
    pub recent_bids: Vec<RecentBid>,
}

impl DashboardSnapshot {
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.last_updated)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

pub fn build_snapshot(
    reconciliation: &Reconciliation,
    recent_limit: usize,
    now: DateTime<Utc>,
) -> DashboardSnapshot {
    let stats = reconciliation.stats();

    let recent_bids = reconciliation
        .recent(recent_limit)
        .into_iter()
        .map(|bid| RecentBid {
            amount: format_fixed(wei_to_eth_f64(bid.net_amount_wei), 2),
            category: bid.category,
            id: bid.id.as_str().to_string(),
        })
        .collect();

    DashboardSnapshot {
        last_updated: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        stats: SnapshotStats {
            total_eth: format_grouped(stats.total_eth),
            market_eth: format_grouped(stats.market_eth),
            limit_eth: format_grouped(stats.limit_eth),
            market_share: format_fixed(stats.market_share, 1),
            limit_share: format_fixed(stats.limit_share, 1),
        },
        recent_bids,
    }
}

/// Render the ledger CSV: net wei, FDV, net ETH, category per retained bid.
pub fn render_ledger_csv(reconciliation: &Reconciliation) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(LEDGER_CSV_HEADER)?;

    for bid in &reconciliation.bids {
        writer.write_record([
            bid.net_amount_wei.to_string(),
            format_plain(bid.fdv_eth),
            format_ether(bid.net_amount_wei),
            bid.category.to_string(),
        ])?;
    }

    writer.into_inner().map_err(|e| ExportError::Io {
        path: PathBuf::from("<memory>"),
        source: e.into_error(),
    })
}

/// Read a previously exported snapshot; `Ok(None)` when there is none.
pub fn load_snapshot(path: &Path) -> Result<Option<DashboardSnapshot>, ExportError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ExportError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| ExportError::Malformed {
            path: path.to_path_buf(),
            source,
        })
}

/// Writes both export artifacts to fixed locations.
#[derive(Debug, Clone)]
pub struct Exporter {
    ledger_csv_path: PathBuf,
    snapshot_path: PathBuf,
}

impl Exporter {
    pub fn new(ledger_csv_path: impl Into<PathBuf>, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            ledger_csv_path: ledger_csv_path.into(),
            snapshot_path: snapshot_path.into(),
        }
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn write_ledger(&self, reconciliation: &Reconciliation) -> Result<(), ExportError> {
        let bytes = render_ledger_csv(reconciliation)?;
        self.replace(&self.ledger_csv_path, &bytes)?;
        info!(
            "Detailed CSV written to {} ({} rows)",
            self.ledger_csv_path.display(),
            reconciliation.bids.len()
        );
        Ok(())
    }

    pub fn write_snapshot(&self, snapshot: &DashboardSnapshot) -> Result<(), ExportError> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        self.replace(&self.snapshot_path, &json)?;
        info!("Dashboard data written to {}", self.snapshot_path.display());
        Ok(())
    }

    fn replace(&self, path: &Path, contents: &[u8]) -> Result<(), ExportError> {
        replace_file(path, contents).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
