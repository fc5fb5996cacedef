//! Chunked, resumable retrieval of auction events.
//!
//! One request per chunk, strictly sequential. Each chunk runs through a small
//! state machine (`Pending -> Succeeded | FailedRetrying -> Succeeded | FailedAborted`);
//! an aborted chunk ends the loop without skipping ahead, so the cache never
//! has a gap below its `last_block`.

use crate::cache::{CacheRecord, CacheStore};
use crate::config::Config;
use crate::datasource::{ChunkEvents, LedgerSource, LedgerSourceError};
use crate::domain::{BlockNumber, BlockRange};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Knobs for the retrieval loop.
#[derive(Debug, Clone)]
pub struct RetrievalSettings {
    pub chunk_size: u64,
    pub lookback_blocks: u64,
    /// Pause after each successful chunk.
    pub request_delay: Duration,
    /// Fixed pause before the single retry of a failed chunk.
    pub retry_delay: Duration,
}

impl RetrievalSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chunk_size: config.chunk_size,
            lookback_blocks: config.lookback_blocks,
            request_delay: Duration::from_millis(config.request_delay_ms),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Split `range` into consecutive sub-ranges of at most `chunk_size` blocks.
pub fn plan_chunks(range: BlockRange, chunk_size: u64) -> Vec<BlockRange> {
    let chunk_size = chunk_size.max(1);
    let end = range.to.as_u64();
    let mut chunks = Vec::new();
    let mut from = range.from.as_u64();

    loop {
        let to = from.saturating_add(chunk_size - 1).min(end);
        chunks.extend(BlockRange::new(from, to));
        match from.checked_add(chunk_size) {
            Some(next) if next <= end => from = next,
            _ => break,
        }
    }

    chunks
}

/// Range still to scan: after the cache if there is one, else the lookback window.
///
/// `None` when the cache is already at (or past) the head.
pub fn resume_range(
    cached: Option<&CacheRecord>,
    head: BlockNumber,
    lookback_blocks: u64,
) -> Option<BlockRange> {
    let start = match cached {
        Some(record) => record.last_block.as_u64().saturating_add(1),
        None => head.as_u64().saturating_sub(lookback_blocks),
    };
    BlockRange::new(start, head.as_u64())
}

/// Per-chunk retrieval state.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkState {
    Pending,
    Succeeded(ChunkEvents),
    FailedRetrying(LedgerSourceError),
    FailedAborted(LedgerSourceError),
}

impl ChunkState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChunkState::Succeeded(_) | ChunkState::FailedAborted(_))
    }
}

/// The chunk that stopped retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkFailure {
    pub range: BlockRange,
    pub error: LedgerSourceError,
}

/// Result of one retrieval pass. Never an error: partial progress is still progress.
#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    /// Range that was due for scanning, `None` if already up to date.
    pub range: Option<BlockRange>,
    pub chunks_planned: usize,
    pub chunks_succeeded: usize,
    pub requests_issued: usize,
    pub aborted: Option<ChunkFailure>,
    /// Cached events plus everything retrieved in this pass.
    pub record: CacheRecord,
}

impl RetrievalOutcome {
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }

    /// Aborted before any chunk landed and with nothing cached to fall back on.
    pub fn retrieved_nothing(&self) -> bool {
        self.aborted.is_some() && self.chunks_succeeded == 0 && self.record.event_count() == 0
    }
}

/// Sequential chunk retriever owning the accumulation and its persistence.
#[derive(Debug, Clone)]
pub struct Retriever {
    source: Arc<dyn LedgerSource>,
    store: Option<CacheStore>,
    settings: RetrievalSettings,
}

impl Retriever {
    /// `store = None` disables caching: no resume, no persistence.
    pub fn new(
        source: Arc<dyn LedgerSource>,
        store: Option<CacheStore>,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            source,
            store,
            settings,
        }
    }

    /// Load the prior cache. A missing or unreadable cache means a fresh start.
    pub fn load_cache(&self) -> Option<CacheRecord> {
        let store = self.store.as_ref()?;
        match store.load() {
            Ok(record) => record,
            Err(e) => {
                warn!("Ignoring unusable cache, starting fresh: {}", e);
                None
            }
        }
    }

    /// Resume from `cached` (or the lookback window) up to `head`.
    pub async fn retrieve_from(
        &self,
        cached: Option<CacheRecord>,
        head: BlockNumber,
    ) -> RetrievalOutcome {
        let range = resume_range(cached.as_ref(), head, self.settings.lookback_blocks);
        let record = match (cached, range) {
            (Some(record), _) => record,
            (None, Some(range)) => CacheRecord::starting_at(range.from),
            (None, None) => CacheRecord::starting_at(head),
        };
        self.retrieve(record, range).await
    }

    /// Scan `range` chunk by chunk, appending into `record`.
    pub async fn retrieve(
        &self,
        mut record: CacheRecord,
        range: Option<BlockRange>,
    ) -> RetrievalOutcome {
        let Some(range) = range else {
            info!(
                "Cache is current at block {}, nothing to retrieve",
                record.last_block
            );
            return RetrievalOutcome {
                range: None,
                chunks_planned: 0,
                chunks_succeeded: 0,
                requests_issued: 0,
                aborted: None,
                record,
            };
        };

        let chunks = plan_chunks(range, self.settings.chunk_size);
        info!(
            "Querying events from {} to {} in {} chunks of {}",
            range.from,
            range.to,
            chunks.len(),
            self.settings.chunk_size
        );

        let mut requests_issued = 0;
        let mut chunks_succeeded = 0;
        let mut aborted = None;

        for (i, chunk) in chunks.iter().enumerate() {
            match self.drive_chunk(*chunk, &mut requests_issued).await {
                ChunkState::Succeeded(events) => {
                    self.absorb(&mut record, *chunk, events);
                    chunks_succeeded += 1;
                    if i + 1 < chunks.len() && !self.settings.request_delay.is_zero() {
                        tokio::time::sleep(self.settings.request_delay).await;
                    }
                }
                ChunkState::FailedAborted(error) => {
                    aborted = Some(ChunkFailure {
                        range: *chunk,
                        error,
                    });
                    break;
                }
                // drive_chunk only returns terminal states
                ChunkState::Pending | ChunkState::FailedRetrying(_) => break,
            }
        }

        info!(
            "Retrieved {}/{} chunks; cache now at block {} ({} bids, {} exits)",
            chunks_succeeded,
            chunks.len(),
            record.last_block,
            record.bid_events.len(),
            record.exit_events.len()
        );

        RetrievalOutcome {
            range: Some(range),
            chunks_planned: chunks.len(),
            chunks_succeeded,
            requests_issued,
            aborted,
            record,
        }
    }

    async fn drive_chunk(&self, range: BlockRange, requests_issued: &mut usize) -> ChunkState {
        let mut state = ChunkState::Pending;

        while !state.is_terminal() {
            state = match state {
                ChunkState::Pending => {
                    debug!(from = %range.from, to = %range.to, "Fetching chunk");
                    *requests_issued += 1;
                    match self.source.fetch_events(range).await {
                        Ok(events) => ChunkState::Succeeded(events),
                        Err(e) => {
                            warn!(from = %range.from, to = %range.to, error = %e, "Chunk failed, retrying once");
                            ChunkState::FailedRetrying(e)
                        }
                    }
                }
                ChunkState::FailedRetrying(_) => {
                    if !self.settings.retry_delay.is_zero() {
                        tokio::time::sleep(self.settings.retry_delay).await;
                    }
                    *requests_issued += 1;
                    match self.source.fetch_events(range).await {
                        Ok(events) => ChunkState::Succeeded(events),
                        Err(e) => {
                            error!(from = %range.from, to = %range.to, error = %e, "Retry failed, stopping retrieval");
                            ChunkState::FailedAborted(e)
                        }
                    }
                }
                terminal => terminal,
            };
        }

        state
    }

    fn absorb(&self, record: &mut CacheRecord, range: BlockRange, events: ChunkEvents) {
        debug!(
            from = %range.from,
            to = %range.to,
            "Chunk yielded {} bids, {} exits",
            events.bid_events.len(),
            events.exit_events.len()
        );
        record.bid_events.extend(events.bid_events);
        record.exit_events.extend(events.exit_events);
        record.last_block = range.to;

        if let Some(store) = &self.store {
            if let Err(e) = store.save(record) {
                warn!(block = %range.to, "Failed to persist cache: {}", e);
            }
        }
    }
}
