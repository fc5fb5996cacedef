//! Hourly inflow report over the last day of cached bids.

use anyhow::Result;
use bidscope::engine::velocity::{VelocityReport, DEFAULT_HOURS_REMAINING, HOURLY_BUCKETS, WINDOW_HOURS};
use bidscope::{config_or_exit, init_tracing, CacheStore};
use clap::Parser;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "velocity")]
#[command(about = "Analyze auction inflow velocity from the event cache")]
struct Cli {
    /// Hours left in the auction, for projections
    #[arg(long, default_value_t = DEFAULT_HOURS_REMAINING)]
    hours_remaining: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = config_or_exit();
    let store = CacheStore::new(config.cache_path.clone());

    let Some(record) = store.load()? else {
        error!("No cache found at {}. Run bidscope first.", store.path().display());
        return Ok(());
    };

    let report = VelocityReport::from_cache(&record);
    info!("Total events: {}", report.total_events);
    info!("Latest block: {}", report.last_block);
    info!("Events in last 24h: {}", report.events_in_window);

    println!("--- 4-Hour Windows ---");
    for (i, total) in report.windows().iter().enumerate() {
        let start = i * WINDOW_HOURS;
        let end = (start + WINDOW_HOURS - 1).min(HOURLY_BUCKETS - 1);
        println!("Hours -{} to -{}: {:.2} ETH", start, end, total);
    }

    println!();
    println!("Total 24h Inflow: {:.2} ETH", report.total_eth);
    println!("Average Hourly Rate: {:.2} ETH/hr", report.average_hourly());
    println!(
        "Last 6h Rate: {:.2} ETH/hr (Total: {:.2})",
        report.recent_hourly(),
        report.recent_total()
    );

    let (from_average, from_recent) = report.projections(cli.hours_remaining);
    println!();
    println!("--- Projections ({}h Remaining) ---", cli.hours_remaining);
    println!("Based on 24h Avg: +{:.0} ETH", from_average);
    println!("Based on 6h Avg:  +{:.0} ETH", from_recent);

    Ok(())
}
