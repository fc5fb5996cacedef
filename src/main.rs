use bidscope::orchestration::RunMode;
use bidscope::{init_tracing, AppError, Config, JsonRpcLedgerSource, LedgerSource, Pipeline, RunReport};
use std::sync::Arc;

async fn run() -> Result<RunReport, AppError> {
    let config = Config::from_env()?;

    tracing::info!(
        "Starting auction analysis against {} (contract {})",
        config.rpc_url,
        config.contract_address
    );

    let source: Arc<dyn LedgerSource> = Arc::new(JsonRpcLedgerSource::new(
        config.rpc_url.clone(),
        config.contract_address.clone(),
    ));

    let report = Pipeline::new(config, source)?.run(chrono::Utc::now()).await?;
    Ok(report)
}

#[tokio::main]
async fn main() {
    init_tracing();

    match run().await {
        Ok(report) => {
            let coverage = match (&report.mode, &report.retrieval) {
                (RunMode::Live, Some(outcome)) if !outcome.is_complete() => "partial",
                (RunMode::Live, _) => "complete",
                (RunMode::CacheOnly, _) => "cache only",
                (RunMode::SnapshotOnly, _) => "snapshot only",
            };
            tracing::info!(
                "Run finished ({}): {} active bids, total {} ETH, market share {}%",
                coverage,
                report.processed_bids,
                report.snapshot.stats.total_eth,
                report.snapshot.stats.market_share
            );
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            eprintln!("{}", e);
            std::process::exit(e.exit_code());
        }
    }
}
