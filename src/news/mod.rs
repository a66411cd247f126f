//! # News Aggregator
//! Ranked news sources, asked in priority order until the quota is filled.
//!
//! A source that errors or comes back empty is skipped. Items leave this
//! module unscored; sentiment is a later stage.

pub mod marketwatch;
pub mod newsapi;
pub mod yahoo_rss;

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use metrics::counter;

use crate::model::NewsItem;
use crate::text::fold_key;

pub use marketwatch::MarketWatch;
pub use newsapi::NewsApi;
pub use yahoo_rss::YahooRss;

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// At most `limit` items for `company_name`, newest first where the
    /// source knows the order.
    async fn try_fetch(&self, company_name: &str, limit: usize) -> Result<Vec<NewsItem>>;
    fn name(&self) -> &'static str;
}

pub struct NewsAggregator {
    sources: Vec<Box<dyn NewsSource>>,
    dedupe: bool,
}

impl NewsAggregator {
    pub fn new(sources: Vec<Box<dyn NewsSource>>) -> Self {
        Self {
            sources,
            dedupe: false,
        }
    }

    /// Drop items whose headline or URL was already collected.
    pub fn with_dedupe(mut self, on: bool) -> Self {
        self.dedupe = on;
        self
    }

    pub async fn collect(&self, company_name: &str, quota: usize) -> Vec<NewsItem> {
        let mut out: Vec<NewsItem> = Vec::with_capacity(quota);
        let mut seen: HashSet<String> = HashSet::new();

        for src in &self.sources {
            if out.len() >= quota {
                break;
            }
            let want = quota - out.len();
            let items = match src.try_fetch(company_name, want).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(company = %company_name, source = src.name(), error = %e, "news source failed");
                    counter!("news_source_errors_total", "source" => src.name()).increment(1);
                    continue;
                }
            };
            if items.is_empty() {
                tracing::debug!(company = %company_name, source = src.name(), "news source returned nothing");
                continue;
            }

            let mut taken = 0usize;
            for mut item in items {
                if out.len() >= quota {
                    break;
                }
                if self.dedupe && !remember(&mut seen, &item) {
                    continue;
                }
                item.sentiment = None;
                item.sentiment_score = None;
                item.sentiment_confidence = None;
                out.push(item);
                taken += 1;
            }
            tracing::debug!(company = %company_name, source = src.name(), taken, "news source contributed");
        }

        if out.is_empty() {
            tracing::info!(company = %company_name, "no news found");
        }
        counter!("news_items_collected_total").increment(out.len() as u64);
        out
    }
}

/// Records the item's keys; `false` when either was already seen.
fn remember(seen: &mut HashSet<String>, item: &NewsItem) -> bool {
    let keys: Vec<String> = [
        item.headline.as_deref().map(|h| format!("h:{}", fold_key(h))),
        item.url.as_deref().map(|u| format!("u:{}", u.trim())),
    ]
    .into_iter()
    .flatten()
    .filter(|k| k.len() > 2)
    .collect();

    if keys.iter().any(|k| seen.contains(k)) {
        return false;
    }
    seen.extend(keys);
    true
}
