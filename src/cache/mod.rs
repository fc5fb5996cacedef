//! Durable event cache: the resumption point between runs.
//!
//! The record is rewritten whole after every retrieved chunk, so an
//! interrupted run loses at most the chunk in flight.

use crate::atomic_file::replace_file;
use crate::domain::{BidEvent, BlockNumber, ExitEvent};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Persisted retrieval state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    /// Highest block fully scanned.
    pub last_block: BlockNumber,
    /// Bid events in ascending ledger order.
    pub bid_events: Vec<BidEvent>,
    /// Exit events in ascending ledger order.
    pub exit_events: Vec<ExitEvent>,
}

impl CacheRecord {
    /// Empty record positioned just before `start_block`.
    pub fn starting_at(start_block: BlockNumber) -> Self {
        Self {
            last_block: BlockNumber::new(start_block.as_u64().saturating_sub(1)),
            bid_events: Vec::new(),
            exit_events: Vec::new(),
        }
    }

    pub fn event_count(&self) -> usize {
        self.bid_events.len() + self.exit_events.len()
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cache file {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// File-backed store for a single [`CacheRecord`].
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record; `Ok(None)` when no cache file exists yet.
    pub fn load(&self) -> Result<Option<CacheRecord>, CacheError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let record: CacheRecord =
            serde_json::from_slice(&bytes).map_err(|source| CacheError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            "Loaded cache from {} (last block {}, {} events)",
            self.path.display(),
            record.last_block,
            record.event_count()
        );
        Ok(Some(record))
    }

    /// Atomically replace the cache file with `record`.
    pub fn save(&self, record: &CacheRecord) -> Result<(), CacheError> {
        let json = serde_json::to_vec(record).map_err(|source| CacheError::Malformed {
            path: self.path.clone(),
            source,
        })?;

        replace_file(&self.path, &json).map_err(|source| CacheError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
