pub mod atomic_file;
pub mod cache;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod export;
pub mod orchestration;
pub mod publish;
pub mod retrieval;
pub mod signals;

pub use cache::{CacheRecord, CacheStore};
pub use config::Config;
pub use datasource::{
    GammaClient, JsonRpcLedgerSource, LedgerSource, LedgerSourceError, MarketSource,
    MockLedgerSource,
};
pub use domain::{
    Address, BidEvent, BidId, BlockNumber, BlockRange, Category, ExitEvent, ProcessedBid, TxHash,
    U256,
};
pub use error::AppError;
pub use orchestration::{Pipeline, RunMode, RunReport};
pub use retrieval::{RetrievalOutcome, Retriever};

/// Install the fmt subscriber: `RUST_LOG` directives on top of an INFO default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();
}

/// Load the environment config, exiting with the config status on failure.
pub fn config_or_exit() -> Config {
    Config::from_env().unwrap_or_else(|e| {
        let err = AppError::from(e);
        tracing::error!("{}", err);
        std::process::exit(err.exit_code());
    })
}
