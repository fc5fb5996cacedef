//! Static page injector: bakes a snapshot into the dashboard template.
//!
//! Each insertion point is replaced at its first occurrence only. Insertion
//! points missing from the template are left alone.

use crate::atomic_file::replace_file;
use crate::export::DashboardSnapshot;
use regex::{NoExpand, Regex};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("invalid insertion pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PublishError {
    pub fn is_missing_template(&self) -> bool {
        matches!(self, PublishError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Compiled insertion points of the dashboard template.
#[derive(Debug, Clone)]
pub struct PageInjector {
    val_total: Regex,
    val_market: Regex,
    val_limit: Regex,
    timestamp: Regex,
    stat_note: Regex,
    market_bar_value: Regex,
    market_bar_height: Regex,
    limit_bar_value: Regex,
    limit_bar_height: Regex,
    headline_share: Regex,
    feed_list: Regex,
}

impl PageInjector {
    pub fn new() -> Result<Self, PublishError> {
        Ok(Self {
            val_total: Regex::new(r#"id="val-total"[^>]*>.*?</div>"#)?,
            val_market: Regex::new(r#"id="val-market"[^>]*>.*?</div>"#)?,
            val_limit: Regex::new(r#"id="val-limit"[^>]*>.*?</div>"#)?,
            timestamp: Regex::new(r#"id="timestamp">.*?</span>"#)?,
            stat_note: Regex::new(r#"(?s)class="stat-note"[^>]*>.*?</div>"#)?,
            market_bar_value: Regex::new(
                r#"<div class="bar-value">.*?%</div>\s*<div class="bar market""#,
            )?,
            market_bar_height: Regex::new(r#"class="bar market" style="height: .*?;""#)?,
            limit_bar_value: Regex::new(
                r#"<div class="bar-value">.*?%</div>\s*<div class="bar limit""#,
            )?,
            limit_bar_height: Regex::new(r#"class="bar limit" style="height: .*?;""#)?,
            headline_share: Regex::new(
                r#"<div style="font-family: var\(--font-heading-h1\); font-size: 4rem; line-height: 1;">.*?%</div>"#,
            )?,
            feed_list: Regex::new(r#"id="feed-list">[\s\S]*?</ul>"#)?,
        })
    }

    /// Render `template` with the snapshot's values.
    pub fn inject(&self, template: &str, snapshot: &DashboardSnapshot, lookback_blocks: u64) -> String {
        let stats = &snapshot.stats;
        let refreshed = utc_string(snapshot);

        let replacements: [(&Regex, String); 11] = [
            (
                &self.val_total,
                format!(r#"id="val-total">{}</div>"#, stats.total_eth),
            ),
            (
                &self.val_market,
                format!(
                    r#"id="val-market" style="color: var(--color-orchid);">{}</div>"#,
                    stats.market_eth
                ),
            ),
            (
                &self.val_limit,
                format!(r#"id="val-limit">{}</div>"#, stats.limit_eth),
            ),
            (
                &self.timestamp,
                format!(r#"id="timestamp">{}</span>"#, refreshed),
            ),
            (
                &self.stat_note,
                format!(
                    "class=\"stat-note\" style=\"margin-top: 20px; font-family: var(--font-mono); font-size: 0.8rem;\">\n                    Scanned {}k Blocks. Refreshed: {}\n                </div>",
                    lookback_blocks / 1000,
                    refreshed
                ),
            ),
            (
                &self.market_bar_value,
                format!(
                    "<div class=\"bar-value\">{}%</div>\n                        <div class=\"bar market\"",
                    stats.market_share
                ),
            ),
            (
                &self.market_bar_height,
                format!(r#"class="bar market" style="height: {}%;""#, stats.market_share),
            ),
            (
                &self.limit_bar_value,
                format!(
                    "<div class=\"bar-value\">{}%</div>\n                        <div class=\"bar limit\"",
                    stats.limit_share
                ),
            ),
            (
                &self.limit_bar_height,
                format!(r#"class="bar limit" style="height: {}%;""#, stats.limit_share),
            ),
            (
                &self.headline_share,
                format!(
                    r#"<div style="font-family: var(--font-heading-h1); font-size: 4rem; line-height: 1;">{}%</div>"#,
                    stats.market_share
                ),
            ),
            (
                &self.feed_list,
                format!("id=\"feed-list\">{}\n            </ul>", feed_items(snapshot)),
            ),
        ];

        let mut html = template.to_string();
        for (pattern, replacement) in replacements {
            if !pattern.is_match(&html) {
                debug!("Insertion point not found: {}", pattern.as_str());
                continue;
            }
            html = pattern
                .replacen(&html, 1, NoExpand(&replacement))
                .into_owned();
        }
        html
    }

    /// Inject into the template file in place.
    pub fn publish(
        &self,
        template_path: &Path,
        snapshot: &DashboardSnapshot,
        lookback_blocks: u64,
    ) -> Result<(), PublishError> {
        let template = std::fs::read_to_string(template_path).map_err(|source| PublishError::Io {
            path: template_path.to_path_buf(),
            source,
        })?;

        let html = self.inject(&template, snapshot, lookback_blocks);

        replace_file(template_path, html.as_bytes()).map_err(|source| PublishError::Io {
            path: template_path.to_path_buf(),
            source,
        })?;
        info!("Stats injected into {}", template_path.display());
        Ok(())
    }
}

/// `Fri, 05 Dec 2025 12:30:00 GMT`, or `Invalid Date` for an unparsable stamp.
fn utc_string(snapshot: &DashboardSnapshot) -> String {
    snapshot
        .last_updated_at()
        .map(|t| t.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
        .unwrap_or_else(|| "Invalid Date".to_string())
}

fn feed_items(snapshot: &DashboardSnapshot) -> String {
    snapshot
        .recent_bids
        .iter()
        .map(|bid| {
            let tag_class = match bid.category {
                crate::domain::Category::Market => "market-tag",
                crate::domain::Category::Limit => "limit-tag",
            };
            format!(
                "\n                <li class=\"feed-item\">\n                    <span class=\"feed-time\">ID: ...{}</span>\n                    <span class=\"feed-amount\">{} ETH</span>\n                    <span class=\"feed-type {}\">{}</span>\n                </li>",
                id_suffix(&bid.id, 6),
                bid.amount,
                tag_class,
                bid.category.as_str().to_uppercase()
            )
        })
        .collect()
}

fn id_suffix(id: &str, chars: usize) -> &str {
    let count = id.chars().count();
    if count <= chars {
        return id;
    }
    match id.char_indices().nth(count - chars) {
        Some((start, _)) => &id[start..],
        None => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use crate::export::{RecentBid, SnapshotStats};
    use tempfile::TempDir;

    const TEMPLATE: &str = r#"<html><body>
<span id="timestamp">Loading...</span>
<div class="stat-value" id="val-total">--</div>
<div class="stat-value" id="val-market">--</div>
<div class="stat-value" id="val-limit">--</div>
<div class="stat-note" style="margin-top: 20px;">
    Scanned 0k Blocks.
</div>
<div class="bar-group">
    <div class="bar-value">0%</div>
    <div class="bar market" style="height: 0%;"></div>
</div>
<div class="bar-group">
    <div class="bar-value">0%</div>
    <div class="bar limit" style="height: 0%;"></div>
</div>
<div style="font-family: var(--font-heading-h1); font-size: 4rem; line-height: 1;">0%</div>
<ul class="feed" id="feed-list">
    <li>placeholder</li>
</ul>
</body></html>"#;

    fn snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            last_updated: "2025-12-05T12:30:00.000Z".to_string(),
            stats: SnapshotStats {
                total_eth: "4,501".to_string(),
                market_eth: "4,500".to_string(),
                limit_eth: "1".to_string(),
                market_share: "99.9".to_string(),
                limit_share: "0.1".to_string(),
            },
            recent_bids: vec![
                RecentBid {
                    amount: "1500.00".to_string(),
                    category: Category::Market,
                    id: "123456789".to_string(),
                },
                RecentBid {
                    amount: "0.50".to_string(),
                    category: Category::Limit,
                    id: "42".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_inject_all_insertion_points() {
        let html = PageInjector::new()
            .unwrap()
            .inject(TEMPLATE, &snapshot(), 200_000);

        assert!(html.contains(r#"id="val-total">4,501</div>"#));
        assert!(html.contains(r#"id="val-market" style="color: var(--color-orchid);">4,500</div>"#));
        assert!(html.contains(r#"id="val-limit">1</div>"#));
        assert!(html.contains(r#"id="timestamp">Fri, 05 Dec 2025 12:30:00 GMT</span>"#));
        assert!(html.contains("Scanned 200k Blocks. Refreshed: Fri, 05 Dec 2025 12:30:00 GMT"));
        assert!(html.contains(r#"class="bar market" style="height: 99.9%;""#));
        assert!(html.contains(r#"class="bar limit" style="height: 0.1%;""#));
        assert!(html.contains("<div class=\"bar-value\">99.9%</div>"));
        assert!(html.contains("<div class=\"bar-value\">0.1%</div>"));
        assert!(html.contains("line-height: 1;\">99.9%</div>"));
        assert!(html.contains("ID: ...456789"));
        assert!(html.contains("ID: ...42"));
        assert!(html.contains("<span class=\"feed-type market-tag\">MARKET</span>"));
        assert!(html.contains("<span class=\"feed-type limit-tag\">LIMIT</span>"));
        assert!(!html.contains("placeholder"));
    }

    #[test]
    fn test_inject_is_stable_on_rerun() {
        let injector = PageInjector::new().unwrap();
        let once = injector.inject(TEMPLATE, &snapshot(), 200_000);
        let twice = injector.inject(&once, &snapshot(), 200_000);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_dollar_signs_are_literal() {
        let mut snap = snapshot();
        snap.stats.total_eth = "$1".to_string();
        let html = PageInjector::new().unwrap().inject(TEMPLATE, &snap, 1000);
        assert!(html.contains(r#"id="val-total">$1</div>"#));
    }

    #[test]
    fn test_publish_missing_template() {
        let temp_dir = TempDir::new().unwrap();
        let err = PageInjector::new()
            .unwrap()
            .publish(&temp_dir.path().join("index.html"), &snapshot(), 200_000)
            .unwrap_err();
        assert!(err.is_missing_template());
    }

    #[test]
    fn test_publish_rewrites_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.html");
        std::fs::write(&path, TEMPLATE).unwrap();

        PageInjector::new()
            .unwrap()
            .publish(&path, &snapshot(), 200_000)
            .unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains(r#"id="val-total">4,501</div>"#));
    }

    #[test]
    fn test_id_suffix() {
        assert_eq!(id_suffix("123456789", 6), "456789");
        assert_eq!(id_suffix("42", 6), "42");
    }
}
