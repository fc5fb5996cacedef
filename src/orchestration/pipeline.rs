use crate::cache::{CacheRecord, CacheStore};
use crate::config::Config;
use crate::datasource::LedgerSource;
use crate::engine::{ReconcileParams, Reconciler};
use crate::export::{build_snapshot, load_snapshot, DashboardSnapshot, ExportError, Exporter};
use crate::publish::{PageInjector, PublishError};
use crate::retrieval::{RetrievalOutcome, RetrievalSettings, Retriever};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// How a run obtained its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Chain head reachable; cache extended (possibly partially) and reconciled.
    Live,
    /// Chain head unreachable and no prior snapshot; reconciled from the cache as-is.
    CacheOnly,
    /// Chain head unreachable; only the page was regenerated from the prior snapshot.
    SnapshotOnly,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: RunMode,
    /// `None` unless the chain head was reachable.
    pub retrieval: Option<RetrievalOutcome>,
    pub processed_bids: usize,
    pub snapshot: DashboardSnapshot,
    pub page_published: bool,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no data source: ledger unreachable ({0}) and no prior snapshot or cache")]
    NoDataSource(String),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// One end-to-end run: retrieve, reconcile, export, publish.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
    source: Arc<dyn LedgerSource>,
    exporter: Exporter,
    injector: PageInjector,
}

impl Pipeline {
    pub fn new(config: Config, source: Arc<dyn LedgerSource>) -> Result<Self, PipelineError> {
        let exporter = Exporter::new(
            config.ledger_csv_path.clone(),
            config.snapshot_path.clone(),
        );
        Ok(Self {
            config,
            source,
            exporter,
            injector: PageInjector::new()?,
        })
    }

    fn retriever(&self) -> Retriever {
        let store = self
            .config
            .cache_enabled
            .then(|| CacheStore::new(self.config.cache_path.clone()));
        Retriever::new(
            self.source.clone(),
            store,
            RetrievalSettings::from_config(&self.config),
        )
    }

    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunReport, PipelineError> {
        let retriever = self.retriever();

        let head = match self.source.head_block().await {
            Ok(head) => head,
            Err(e) => {
                warn!("Cannot read chain head: {}", e);
                return self.run_offline(&retriever, e.to_string(), now);
            }
        };
        info!("Current block: {}", head);

        let cached = retriever.load_cache();
        let outcome = retriever.retrieve_from(cached, head).await;
        if let Some(failure) = &outcome.aborted {
            warn!(
                "Retrieval stopped at chunk {}; continuing with data through block {}",
                failure.range, outcome.record.last_block
            );
        }
        if outcome.retrieved_nothing() {
            warn!(
                "No events retrieved or cached; exporting an empty snapshot over {}",
                self.exporter.snapshot_path().display()
            );
        }

        let (snapshot, processed_bids) = self.reconcile_and_export(&outcome.record, now)?;
        let page_published = self.publish(&snapshot);

        Ok(RunReport {
            mode: RunMode::Live,
            retrieval: Some(outcome),
            processed_bids,
            snapshot,
            page_published,
        })
    }

    /// Fallback ladder without a chain head: prior snapshot, then cache, else fatal.
    fn run_offline(
        &self,
        retriever: &Retriever,
        cause: String,
        now: DateTime<Utc>,
    ) -> Result<RunReport, PipelineError> {
        match load_snapshot(self.exporter.snapshot_path()) {
            Ok(Some(snapshot)) => {
                info!(
                    "Regenerating page from existing snapshot (last updated {})",
                    snapshot.last_updated
                );
                let page_published = self.publish(&snapshot);
                return Ok(RunReport {
                    mode: RunMode::SnapshotOnly,
                    retrieval: None,
                    processed_bids: 0,
                    snapshot,
                    page_published,
                });
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring unusable snapshot: {}", e),
        }

        let Some(record) = retriever.load_cache() else {
            error!("Ledger unreachable and nothing to fall back on");
            return Err(PipelineError::NoDataSource(cause));
        };

        info!(
            "Reconciling from cache only (last block {})",
            record.last_block
        );
        let (snapshot, processed_bids) = self.reconcile_and_export(&record, now)?;
        let page_published = self.publish(&snapshot);

        Ok(RunReport {
            mode: RunMode::CacheOnly,
            retrieval: None,
            processed_bids,
            snapshot,
            page_published,
        })
    }

    fn reconcile_and_export(
        &self,
        record: &CacheRecord,
        now: DateTime<Utc>,
    ) -> Result<(DashboardSnapshot, usize), PipelineError> {
        let reconciler = Reconciler::new(ReconcileParams {
            market_threshold_fdv_eth: self.config.market_threshold_fdv_eth,
            total_supply: self.config.total_supply,
        });
        let reconciliation = reconciler.reconcile(&record.bid_events, &record.exit_events);

        info!(
            "Found {} bid submissions and {} exits; {} bids active",
            record.bid_events.len(),
            record.exit_events.len(),
            reconciliation.bids.len()
        );
        let stats = reconciliation.stats();
        info!(
            "Total active ETH committed: {:.4} (market {:.4}, limit {:.4})",
            stats.total_eth, stats.market_eth, stats.limit_eth
        );

        self.exporter.write_ledger(&reconciliation)?;
        let snapshot = build_snapshot(&reconciliation, self.config.recent_bids_limit, now);
        self.exporter.write_snapshot(&snapshot)?;

        Ok((snapshot, reconciliation.bids.len()))
    }

    /// A missing or unwritable template is not fatal for a run.
    fn publish(&self, snapshot: &DashboardSnapshot) -> bool {
        match self
            .injector
            .publish(&self.config.template_path, snapshot, self.config.lookback_blocks)
        {
            Ok(()) => true,
            Err(e) if e.is_missing_template() => {
                warn!(
                    "Template {} not found, skipping page injection",
                    self.config.template_path.display()
                );
                false
            }
            Err(e) => {
                warn!("Page injection failed: {}", e);
                false
            }
        }
    }
}
