use bidscope::cache::{CacheRecord, CacheStore};
use bidscope::datasource::MockLedgerSource;
use bidscope::domain::{Address, BidEvent, BidId, BlockNumber, BlockRange, ExitEvent, TxHash, U256};
use bidscope::engine::{ReconcileParams, Reconciler};
use bidscope::retrieval::{RetrievalSettings, Retriever};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn settings(chunk_size: u64) -> RetrievalSettings {
    RetrievalSettings {
        chunk_size,
        lookback_blocks: 200_000,
        request_delay: Duration::ZERO,
        retry_delay: Duration::ZERO,
    }
}

fn bid(id: &str, amount: u64, block: u64) -> BidEvent {
    BidEvent {
        id: BidId::new(id.to_string()),
        owner: Address::new("0xowner".to_string()),
        price_q96: U256::from(1u8) << 96usize,
        amount_wei: U256::from(amount),
        block_number: BlockNumber::new(block),
        transaction_hash: TxHash::new(format!("0xbid{}", id)),
        log_index: 0,
    }
}

fn exit(bid_id: &str, refunded: u64, block: u64) -> ExitEvent {
    ExitEvent {
        bid_id: BidId::new(bid_id.to_string()),
        owner: Address::new("0xowner".to_string()),
        tokens_filled: U256::ZERO,
        currency_refunded: U256::from(refunded),
        block_number: BlockNumber::new(block),
        transaction_hash: TxHash::new(format!("0xexit{}", bid_id)),
        log_index: 1,
    }
}

fn params() -> ReconcileParams {
    ReconcileParams {
        market_threshold_fdv_eth: 10_000_000.0,
        total_supply: 10_350_000_000,
    }
}

#[tokio::test]
async fn test_second_chunk_fails_twice_persists_first() {
    let temp_dir = TempDir::new().unwrap();
    let store = CacheStore::new(temp_dir.path().join("events_cache.json"));

    let first = BlockRange::new(1000, 1999).unwrap();
    let second = BlockRange::new(2000, 2500).unwrap();
    let source = Arc::new(
        MockLedgerSource::new()
            .with_head(2500)
            .with_bids(vec![bid("1", 1000, 1500), bid("2", 700, 2100)])
            .failing(second, 2),
    );
    let retriever = Retriever::new(source.clone(), Some(store.clone()), settings(1000));

    let outcome = retriever
        .retrieve(
            CacheRecord::starting_at(BlockNumber::new(1000)),
            BlockRange::new(1000, 2500),
        )
        .await;

    assert_eq!(source.requests(), vec![first, second, second]);
    assert_eq!(outcome.chunks_planned, 2);
    assert_eq!(outcome.chunks_succeeded, 1);
    assert_eq!(outcome.requests_issued, 3);
    assert!(!outcome.is_complete());
    assert_eq!(outcome.aborted.as_ref().unwrap().range, second);

    let persisted = store.load().unwrap().unwrap();
    assert_eq!(persisted.last_block, BlockNumber::new(1999));
    assert_eq!(persisted, outcome.record);

    // reconciliation sees only events through block 1999
    let result = Reconciler::new(params()).reconcile(&persisted.bid_events, &persisted.exit_events);
    assert_eq!(result.bids.len(), 1);
    assert_eq!(result.bids[0].id.as_str(), "1");
    assert_eq!(result.net_total(), U256::from(1000u64));
}

#[tokio::test]
async fn test_resume_at_head_issues_no_requests() {
    let temp_dir = TempDir::new().unwrap();
    let store = CacheStore::new(temp_dir.path().join("events_cache.json"));
    let cached = CacheRecord {
        last_block: BlockNumber::new(2500),
        bid_events: vec![bid("1", 1000, 1500)],
        exit_events: vec![],
    };
    store.save(&cached).unwrap();

    let source = Arc::new(MockLedgerSource::new().with_head(2500).with_bid(bid("9", 5, 2400)));
    let retriever = Retriever::new(source.clone(), Some(store.clone()), settings(500));

    let outcome = retriever
        .retrieve_from(retriever.load_cache(), BlockNumber::new(2500))
        .await;

    assert!(source.requests().is_empty());
    assert_eq!(outcome.requests_issued, 0);
    assert!(outcome.range.is_none());
    assert_eq!(outcome.record, cached);
    assert_eq!(store.load().unwrap().unwrap(), cached);
}

#[tokio::test]
async fn test_resume_extends_cache_across_runs() {
    let temp_dir = TempDir::new().unwrap();
    let store = CacheStore::new(temp_dir.path().join("events_cache.json"));

    let source = Arc::new(
        MockLedgerSource::new()
            .with_head(1200)
            .with_bid(bid("1", 1000, 100))
            .with_bid(bid("2", 500, 1100))
            .with_exit(exit("1", 400, 1150)),
    );

    // first run: fresh start with a lookback of 1000 blocks from head 1000
    let mut first_settings = settings(500);
    first_settings.lookback_blocks = 1000;
    let retriever = Retriever::new(source.clone(), Some(store.clone()), first_settings.clone());
    let first = retriever
        .retrieve_from(retriever.load_cache(), BlockNumber::new(1000))
        .await;
    assert_eq!(first.record.last_block, BlockNumber::new(1000));
    assert_eq!(first.record.bid_events.len(), 1);

    // second run resumes at 1001 and appends
    let retriever = Retriever::new(source.clone(), Some(store.clone()), first_settings);
    let second = retriever
        .retrieve_from(retriever.load_cache(), BlockNumber::new(1200))
        .await;
    assert_eq!(second.range, BlockRange::new(1001, 1200));
    assert_eq!(second.record.last_block, BlockNumber::new(1200));

    let ids: Vec<&str> = second.record.bid_events.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(second.record.exit_events.len(), 1);

    let result = Reconciler::new(params()).reconcile(&second.record.bid_events, &second.record.exit_events);
    assert_eq!(result.bids[0].net_amount_wei, U256::from(600u64));
    assert_eq!(result.net_total(), U256::from(1100u64));
}

#[tokio::test]
async fn test_corrupt_cache_restarts_from_lookback() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("events_cache.json");
    std::fs::write(&path, "{\"lastBlock\": \"oops\"").unwrap();
    let store = CacheStore::new(&path);

    let source = Arc::new(MockLedgerSource::new().with_head(5000));
    let mut s = settings(1000);
    s.lookback_blocks = 1000;
    let retriever = Retriever::new(source.clone(), Some(store.clone()), s);

    assert!(retriever.load_cache().is_none());
    let outcome = retriever
        .retrieve_from(retriever.load_cache(), BlockNumber::new(5000))
        .await;

    assert_eq!(outcome.range, BlockRange::new(4000, 5000));
    assert_eq!(source.requests().len(), 2);
    assert_eq!(store.load().unwrap().unwrap().last_block, BlockNumber::new(5000));
}

#[tokio::test]
async fn test_cache_disabled_never_writes() {
    let temp_dir = TempDir::new().unwrap();
    let source = Arc::new(MockLedgerSource::new().with_head(99).with_bid(bid("1", 10, 50)));
    let retriever = Retriever::new(source, None, settings(50));

    let outcome = retriever.retrieve_from(retriever.load_cache(), BlockNumber::new(99)).await;

    assert!(outcome.is_complete());
    assert_eq!(outcome.record.bid_events.len(), 1);
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}
