use anyhow::{Context, Result};
use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use super::NewsSource;
use crate::http;
use crate::model::NewsItem;
use crate::text::{non_empty, normalize_text};

const FEED_URL: &str = "https://feeds.finance.yahoo.com/rss/2.0/headline";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// `Tue, 02 Jan 2024 14:30:00 +0000` → `2024-01-02` (UTC). Empty when unparseable.
fn rfc2822_to_day(ts: &str) -> String {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .map(|dt| {
            let d = dt.to_offset(UtcOffset::UTC).date();
            format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day())
        })
        .unwrap_or_default()
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

/// Parse a Yahoo headline feed into unscored items, feed order kept.
pub fn parse_feed(xml: &str, limit: usize) -> Result<Vec<NewsItem>> {
    let rss: Rss = from_str(&scrub_html_entities_for_xml(xml)).context("parsing yahoo rss xml")?;

    let mut out = Vec::with_capacity(rss.channel.item.len().min(limit));
    for it in rss.channel.item {
        if out.len() >= limit {
            break;
        }
        let Some(headline) = it.title.as_deref().map(normalize_text).and_then(|t| non_empty(&t)) else {
            continue;
        };
        out.push(NewsItem {
            headline: Some(headline),
            summary: it
                .description
                .as_deref()
                .map(normalize_text)
                .and_then(|t| non_empty(&t)),
            source: "Yahoo Finance".to_string(),
            date: it.pub_date.as_deref().map(rfc2822_to_day).unwrap_or_default(),
            url: it.link.and_then(|l| non_empty(&l)),
            ..NewsItem::default()
        });
    }
    Ok(out)
}

/// Yahoo Finance headline RSS feed for the company, queried by name.
pub struct YahooRss {
    client: reqwest::Client,
}

impl YahooRss {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NewsSource for YahooRss {
    async fn try_fetch(&self, company_name: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let body = http::get_text(
            &self.client,
            FEED_URL,
            &[("s", company_name.trim()), ("region", "US"), ("lang", "en-US")],
        )
        .await?;
        parse_feed(&body, limit)
    }

    fn name(&self) -> &'static str {
        "yahoo_rss"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc2822_dates_become_utc_days() {
        assert_eq!(rfc2822_to_day("Tue, 02 Jan 2024 14:30:00 +0000"), "2024-01-02");
        assert_eq!(rfc2822_to_day("Tue, 02 Jan 2024 23:30:00 -0500"), "2024-01-03");
        assert_eq!(rfc2822_to_day("yesterday"), "");
    }

    #[test]
    fn empty_channel_is_no_items() {
        let xml = "<rss><channel><title>Yahoo</title></channel></rss>";
        assert!(parse_feed(xml, 5).unwrap().is_empty());
    }
}
