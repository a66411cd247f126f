use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::NewsSource;
use crate::http;
use crate::model::NewsItem;
use crate::text::{non_empty, normalize_text};

const SEARCH_URL: &str = "https://www.marketwatch.com/search";

/// Anchor inside a `card__headline` element.
static RE_HEADLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)class="[^"]*\bcard__headline\b[^"]*"[^>]*>.*?<a\b[^>]*?href="([^"]*)"[^>]*>(.*?)</a>"#)
        .expect("marketwatch headline regex")
});

/// MarketWatch keyword search page. The page carries no usable dates, so
/// items are stamped with the fetch day.
pub struct MarketWatch {
    client: reqwest::Client,
}

impl MarketWatch {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

pub fn parse_search_page(html: &str, limit: usize, today: NaiveDate) -> Vec<NewsItem> {
    let date = today.format("%Y-%m-%d").to_string();
    RE_HEADLINE
        .captures_iter(html)
        .filter_map(|c| {
            let headline = non_empty(&normalize_text(&c[2]))?;
            Some(NewsItem {
                headline: Some(headline),
                source: "MarketWatch".to_string(),
                date: date.clone(),
                url: non_empty(&c[1]),
                ..NewsItem::default()
            })
        })
        .take(limit)
        .collect()
}

#[async_trait]
impl NewsSource for MarketWatch {
    async fn try_fetch(&self, company_name: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let body = http::get_text(
            &self.client,
            SEARCH_URL,
            &[
                ("q", company_name),
                ("m", "Keyword"),
                ("rpp", "15"),
                ("mp", "0"),
                ("bd", "false"),
                ("rs", "true"),
            ],
        )
        .await?;
        Ok(parse_search_page(&body, limit, Utc::now().date_naive()))
    }

    fn name(&self) -> &'static str {
        "marketwatch"
    }
}
