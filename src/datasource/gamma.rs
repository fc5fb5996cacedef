//! Prediction-market listing client (Gamma API).

use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error)]
pub enum GammaError {
    #[error("http error: {0}")]
    Http(String),
    #[error("unexpected http status: {0}")]
    HttpStatus(u16),
    #[error("rate limited")]
    RateLimited,
    #[error("parse error: {0}")]
    Parse(String),
}

/// One market as listed by the Gamma API (only the fields the scanner reads).
///
/// Gamma serialises list-valued fields either as JSON arrays or as
/// JSON-encoded strings, so those are kept as raw values and decoded lazily.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaMarket {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub condition_id: Option<String>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub outcome_prices: Option<serde_json::Value>,
    #[serde(default)]
    pub volume24hr: Option<serde_json::Value>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub end_date_iso: Option<String>,
    #[serde(default)]
    pub clob_token_ids: Option<serde_json::Value>,
    #[serde(default)]
    pub closed: Option<bool>,
    #[serde(default)]
    pub resolved: Option<bool>,
}

fn string_list(value: &Option<serde_json::Value>) -> Vec<String> {
    let items = match value {
        Some(serde_json::Value::Array(items)) => items.clone(),
        Some(serde_json::Value::String(encoded)) => {
            serde_json::from_str::<Vec<serde_json::Value>>(encoded).unwrap_or_default()
        }
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

impl GammaMarket {
    /// Price of the first (YES) outcome, if present and numeric.
    pub fn yes_price(&self) -> Option<Decimal> {
        string_list(&self.outcome_prices)
            .first()
            .and_then(|p| Decimal::from_str(p.trim()).ok())
    }

    /// 24h volume; missing or malformed counts as zero.
    pub fn volume_24h(&self) -> f64 {
        match &self.volume24hr {
            Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// First CLOB token id, or empty.
    pub fn yes_token_id(&self) -> String {
        string_list(&self.clob_token_ids)
            .into_iter()
            .next()
            .unwrap_or_default()
    }

    /// End date, preferring the full timestamp over the ISO date field.
    pub fn end_date_str(&self) -> Option<&str> {
        self.end_date.as_deref().or(self.end_date_iso.as_deref())
    }

    pub fn is_settled(&self) -> bool {
        self.closed.unwrap_or(false) || self.resolved.unwrap_or(false)
    }
}

/// Source of market listings, abstracted for testing.
#[async_trait]
pub trait MarketSource: Send + Sync {
    async fn fetch_active_markets(&self, limit: usize) -> Result<Vec<GammaMarket>, GammaError>;

    async fn fetch_market(&self, market_id: &str) -> Result<GammaMarket, GammaError>;
}

/// HTTP client for the public Gamma API.
#[derive(Debug, Clone)]
pub struct GammaClient {
    client: Client,
    base_url: String,
}

impl GammaClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T>(&self, url: &str) -> Result<T, GammaError>
    where
        T: serde::de::DeserializeOwned,
    {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(GammaError::Http(e.to_string())))?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(GammaError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(GammaError::HttpStatus(
                    status.as_u16(),
                )));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(GammaError::HttpStatus(
                    status.as_u16(),
                )));
            }

            response
                .json::<T>()
                .await
                .map_err(|e| backoff::Error::permanent(GammaError::Parse(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl MarketSource for GammaClient {
    async fn fetch_active_markets(&self, limit: usize) -> Result<Vec<GammaMarket>, GammaError> {
        let url = format!("{}/markets?active=true&limit={}", self.base_url, limit);
        debug!("Fetching active markets from {}", url);
        self.get_json(&url).await
    }

    async fn fetch_market(&self, market_id: &str) -> Result<GammaMarket, GammaError> {
        let url = format!("{}/markets/{}", self.base_url, market_id);
        debug!("Fetching market {}", market_id);
        self.get_json(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_prices_as_encoded_string() {
        let market: GammaMarket = serde_json::from_value(serde_json::json!({
            "id": "123",
            "question": "Will it rain?",
            "outcomePrices": "[\"0.235\", \"0.765\"]",
            "volume24hr": 12000.5,
            "clobTokenIds": "[\"111\", \"222\"]"
        }))
        .unwrap();

        assert_eq!(market.yes_price(), Some(Decimal::from_str("0.235").unwrap()));
        assert_eq!(market.volume_24h(), 12000.5);
        assert_eq!(market.yes_token_id(), "111");
    }

    #[test]
    fn test_outcome_prices_as_array() {
        let market: GammaMarket = serde_json::from_value(serde_json::json!({
            "id": "1",
            "outcomePrices": ["0.9", "0.1"],
            "volume24hr": "6000"
        }))
        .unwrap();

        assert_eq!(market.yes_price(), Some(Decimal::from_str("0.9").unwrap()));
        assert_eq!(market.volume_24h(), 6000.0);
    }

    #[test]
    fn test_missing_fields_default() {
        let market: GammaMarket = serde_json::from_value(serde_json::json!({"id": "1"})).unwrap();
        assert_eq!(market.yes_price(), None);
        assert_eq!(market.volume_24h(), 0.0);
        assert_eq!(market.yes_token_id(), "");
        assert!(market.end_date_str().is_none());
        assert!(!market.is_settled());
    }

    #[test]
    fn test_end_date_prefers_full_timestamp() {
        let market = GammaMarket {
            end_date: Some("2026-11-01T00:00:00Z".to_string()),
            end_date_iso: Some("2026-11-02".to_string()),
            ..Default::default()
        };
        assert_eq!(market.end_date_str(), Some("2026-11-01T00:00:00Z"));
    }
}
