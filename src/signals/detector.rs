//! Mean-reversion mispricing heuristic over prediction-market odds.
//!
//! Longshots (YES below 30%) are read as underpriced and favorites (above
//! 70%) as overpriced, but only at one to four week horizons.

use crate::datasource::GammaMarket;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Horizon used when a market has no usable end date; always out of range.
pub const UNKNOWN_HORIZON_DAYS: f64 = 999.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SignalConfig {
    pub min_volume_24h: f64,
    pub longshot_threshold: f64,
    pub favorite_threshold: f64,
    pub min_horizon_days: f64,
    pub max_horizon_days: f64,
    pub weak_mispricing: f64,
    pub moderate_mispricing: f64,
    pub strong_mispricing: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_volume_24h: 5_000.0,
            longshot_threshold: 0.30,
            favorite_threshold: 0.70,
            min_horizon_days: 7.0,
            max_horizon_days: 30.0,
            weak_mispricing: 0.03,
            moderate_mispricing: 0.07,
            strong_mispricing: 0.12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => f.pad("BUY"),
            Direction::Sell => f.pad("SELL"),
        }
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strength::Weak => f.pad("weak"),
            Strength::Moderate => f.pad("moderate"),
            Strength::Strong => f.pad("strong"),
        }
    }
}

/// A detected mispricing on one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub market_id: String,
    #[serde(default)]
    pub condition_id: Option<String>,
    pub question: String,
    pub direction: Direction,
    /// YES price at detection.
    pub price: Decimal,
    pub volume_24h: f64,
    pub horizon_days: i64,
    pub mispricing: f64,
    pub strength: Strength,
    pub thesis: String,
    pub timestamp: String,
    #[serde(default)]
    pub token_id: String,
}

/// Days from `now` to the market's end date, or [`UNKNOWN_HORIZON_DAYS`].
pub fn horizon_days(market: &GammaMarket, now: DateTime<Utc>) -> f64 {
    let Some(end) = market.end_date_str().and_then(parse_end_date) else {
        return UNKNOWN_HORIZON_DAYS;
    };
    (end - now).num_milliseconds() as f64 / 86_400_000.0
}

fn parse_end_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    // date-only values are midnight UTC
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
}

/// Mispricing estimate, strongest around a two week horizon.
pub fn estimate_mispricing(
    config: &SignalConfig,
    price: f64,
    direction: Direction,
    horizon_days: f64,
) -> f64 {
    let base = match direction {
        Direction::Buy => (config.longshot_threshold - price) * 0.5,
        Direction::Sell => (price - config.favorite_threshold) * 0.4,
    };
    let horizon_factor = 1.0 - (horizon_days - 14.0).abs() / 21.0;
    (base * (0.7 + 0.6 * horizon_factor)).max(0.0)
}

pub fn analyze_market(
    market: &GammaMarket,
    config: &SignalConfig,
    now: DateTime<Utc>,
) -> Option<Signal> {
    let price = market.yes_price()?;
    let price_f = price.to_f64()?;
    if price_f <= 0.0 || price_f >= 1.0 {
        return None;
    }

    let volume = market.volume_24h();
    if volume < config.min_volume_24h {
        return None;
    }

    let horizon = horizon_days(market, now);
    if horizon < config.min_horizon_days || horizon > config.max_horizon_days {
        return None;
    }

    let (direction, thesis) = if price_f < config.longshot_threshold {
        (Direction::Buy, "Longshot underpriced at intermediate horizon")
    } else if price_f > config.favorite_threshold {
        (Direction::Sell, "Favorite overpriced at intermediate horizon")
    } else {
        return None;
    };

    let mispricing = estimate_mispricing(config, price_f, direction, horizon);
    if mispricing < config.weak_mispricing {
        return None;
    }

    let strength = if mispricing >= config.strong_mispricing {
        Strength::Strong
    } else if mispricing >= config.moderate_mispricing {
        Strength::Moderate
    } else {
        Strength::Weak
    };

    Some(Signal {
        market_id: market.id.clone(),
        condition_id: market.condition_id.clone(),
        question: market.question.clone(),
        direction,
        price,
        volume_24h: volume,
        horizon_days: horizon.round() as i64,
        mispricing,
        strength,
        thesis: thesis.to_string(),
        timestamp: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        token_id: market.yes_token_id(),
    })
}

/// Signals for every qualifying market, largest mispricing first.
pub fn scan(markets: &[GammaMarket], config: &SignalConfig, now: DateTime<Utc>) -> Vec<Signal> {
    let mut signals: Vec<Signal> = markets
        .iter()
        .filter_map(|m| analyze_market(m, config, now))
        .collect();
    signals.sort_by(|a, b| b.mispricing.total_cmp(&a.mispricing));
    signals
}
