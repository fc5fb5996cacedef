use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_RPC_URL: &str = "https://eth.llamarpc.com";
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x608c4e792c65f5527b3f70715dea44d3b302f4ee";
pub const DEFAULT_GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";

/// ~28 days of blocks at 12s.
pub const DEFAULT_LOOKBACK_BLOCKS: u64 = 200_000;
pub const DEFAULT_CHUNK_SIZE: u64 = 500;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 200;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
/// FDV (in ETH) above which a bid is treated as a market order.
pub const DEFAULT_MARKET_THRESHOLD_FDV_ETH: f64 = 10_000_000.0;
/// 10.35B tokens.
pub const DEFAULT_TOTAL_SUPPLY: u64 = 10_350_000_000;
pub const DEFAULT_RECENT_BIDS_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub contract_address: String,
    pub cache_enabled: bool,
    pub cache_path: PathBuf,
    pub lookback_blocks: u64,
    pub chunk_size: u64,
    pub request_delay_ms: u64,
    pub retry_delay_ms: u64,
    pub market_threshold_fdv_eth: f64,
    pub total_supply: u64,
    pub recent_bids_limit: usize,
    pub ledger_csv_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub template_path: PathBuf,
    pub gamma_api_url: String,
    pub signal_journal_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            cache_enabled: true,
            cache_path: PathBuf::from("data/events_cache.json"),
            lookback_blocks: DEFAULT_LOOKBACK_BLOCKS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            market_threshold_fdv_eth: DEFAULT_MARKET_THRESHOLD_FDV_ETH,
            total_supply: DEFAULT_TOTAL_SUPPLY,
            recent_bids_limit: DEFAULT_RECENT_BIDS_LIMIT,
            ledger_csv_path: PathBuf::from("output/bids_analysis.csv"),
            snapshot_path: PathBuf::from("dashboard/data.json"),
            template_path: PathBuf::from("dashboard/index.html"),
            gamma_api_url: DEFAULT_GAMMA_API_URL.to_string(),
            signal_journal_path: PathBuf::from("data/paper_trades.json"),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let string_or = |key: &str, default: String| -> String {
            env_map
                .get(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(default)
        };
        let path_or = |key: &str, default: PathBuf| -> PathBuf {
            env_map
                .get(key)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or(default)
        };

        let cache_enabled = match env_map
            .get("CACHE_ENABLED")
            .map(|s| s.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("") | Some("true") | Some("1") | Some("yes") => true,
            Some("false") | Some("0") | Some("no") => false,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "CACHE_ENABLED".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        let chunk_size = parse_u64(&env_map, "CHUNK_SIZE", defaults.chunk_size)?;
        if chunk_size == 0 {
            return Err(ConfigError::InvalidValue(
                "CHUNK_SIZE".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let market_threshold_fdv_eth = match env_map.get("MARKET_THRESHOLD_FDV_ETH") {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "MARKET_THRESHOLD_FDV_ETH".to_string(),
                        "must be a finite non-negative number".to_string(),
                    )
                })?,
            None => defaults.market_threshold_fdv_eth,
        };

        let recent_bids_limit = parse_u64(
            &env_map,
            "RECENT_BIDS_LIMIT",
            defaults.recent_bids_limit as u64,
        )? as usize;

        Ok(Config {
            rpc_url: string_or("RPC_URL", defaults.rpc_url),
            contract_address: string_or("CONTRACT_ADDRESS", defaults.contract_address),
            cache_enabled,
            cache_path: path_or("CACHE_PATH", defaults.cache_path),
            lookback_blocks: parse_u64(&env_map, "LOOKBACK_BLOCKS", defaults.lookback_blocks)?,
            chunk_size,
            request_delay_ms: parse_u64(&env_map, "REQUEST_DELAY_MS", defaults.request_delay_ms)?,
            retry_delay_ms: parse_u64(&env_map, "RETRY_DELAY_MS", defaults.retry_delay_ms)?,
            market_threshold_fdv_eth,
            total_supply: parse_u64(&env_map, "TOTAL_SUPPLY", defaults.total_supply)?,
            recent_bids_limit,
            ledger_csv_path: path_or("LEDGER_CSV_PATH", defaults.ledger_csv_path),
            snapshot_path: path_or("SNAPSHOT_PATH", defaults.snapshot_path),
            template_path: path_or("TEMPLATE_PATH", defaults.template_path),
            gamma_api_url: string_or("GAMMA_API_URL", defaults.gamma_api_url),
            signal_journal_path: path_or("SIGNAL_JOURNAL_PATH", defaults.signal_journal_path),
        })
    }
}

fn parse_u64(env_map: &HashMap<String, String>, key: &str, default: u64) -> Result<u64, ConfigError> {
    match env_map.get(key) {
        Some(raw) => raw.trim().replace('_', "").parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(key.to_string(), "must be a valid u64".to_string())
        }),
        None => Ok(default),
    }
}
