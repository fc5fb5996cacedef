//! Mispricing scanner with a local paper-trade journal.

use anyhow::{bail, Result};
use bidscope::datasource::{GammaClient, MarketSource};
use bidscope::signals::{scan, Journal, SignalConfig, SignalStatus, SCAN_MARKET_LIMIT};
use bidscope::{config_or_exit, init_tracing};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;

#[derive(Parser)]
#[command(name = "signals")]
#[command(about = "Mean-reversion signals on prediction-market odds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan active markets and list signals
    Scan {
        /// Maximum number of signals to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Scan, then journal the signal for a market as a paper trade
    Log {
        /// Market id to log
        market_id: String,
    },

    /// Refresh pending paper trades and resolve settled ones
    Update,

    /// Show the journal and its statistics
    History,

    /// Remove every journaled trade
    Clear,
}

fn cents(price: Decimal) -> String {
    format!("{}¢", (price * Decimal::ONE_HUNDRED).round())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = config_or_exit();
    let client = GammaClient::new(config.gamma_api_url.clone());
    let mut journal = Journal::open(config.signal_journal_path.clone());
    let now = chrono::Utc::now();

    match cli.command {
        Commands::Scan { limit } => {
            let markets = client.fetch_active_markets(SCAN_MARKET_LIMIT).await?;
            let signals = scan(&markets, &SignalConfig::default(), now);
            info!("{} signals from {} markets", signals.len(), markets.len());

            for signal in signals.iter().take(limit) {
                let logged = if journal.contains(&signal.market_id) { " [logged]" } else { "" };
                println!(
                    "{:<4} {:<8} {:>5} {:>5.1}% {:>3}d  {} ({}){}",
                    signal.direction,
                    signal.strength,
                    cents(signal.price),
                    signal.mispricing * 100.0,
                    signal.horizon_days,
                    signal.question,
                    signal.market_id,
                    logged
                );
            }
        }
        Commands::Log { market_id } => {
            let markets = client.fetch_active_markets(SCAN_MARKET_LIMIT).await?;
            let Some(signal) = scan(&markets, &SignalConfig::default(), now)
                .into_iter()
                .find(|s| s.market_id == market_id)
            else {
                bail!("no current signal for market {}", market_id);
            };

            if journal.log(signal, now)? {
                println!("Logged paper trade for market {}", market_id);
            } else {
                println!("Market {} is already journaled", market_id);
            }
        }
        Commands::Update => {
            let summary = journal.update_outcomes(&client).await?;
            println!(
                "Resolved {}, refreshed {}, failed {}",
                summary.resolved, summary.refreshed, summary.failed
            );
        }
        Commands::History => {
            for entry in journal.entries() {
                let (price, outcome) = match entry.status {
                    SignalStatus::Resolved => {
                        let pnl = entry.pnl.unwrap_or_default();
                        let outcome = if pnl >= Decimal::ZERO { "WIN" } else { "LOSS" };
                        (
                            entry.exit_price.unwrap_or_default(),
                            format!("{} {:+.2}", outcome, pnl),
                        )
                    }
                    SignalStatus::Pending => (
                        entry.current_price.unwrap_or(entry.entry_price),
                        "Pending".to_string(),
                    ),
                };
                println!(
                    "{}  {:<4} entry {:>5} now {:>5}  {}  {}",
                    entry.logged_at,
                    entry.signal.direction,
                    cents(entry.entry_price),
                    cents(price),
                    outcome,
                    entry.signal.question
                );
            }

            let stats = journal.stats();
            let win_rate = stats
                .win_rate
                .map(|r| format!("{:.0}%", r))
                .unwrap_or_else(|| "--".to_string());
            println!(
                "Trades: {}  Resolved: {}  Win rate: {}  Total PnL: ${:.2}",
                stats.total, stats.resolved, win_rate, stats.total_pnl
            );
        }
        Commands::Clear => {
            journal.clear()?;
            println!("Cleared paper trade history");
        }
    }

    Ok(())
}
