use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;

use super::NewsSource;
use crate::http;
use crate::model::NewsItem;
use crate::text::{non_empty, normalize_text};

const EVERYTHING_URL: &str = "https://newsapi.org/v2/everything";
const LOOKBACK_DAYS: i64 = 7;

/// NewsAPI `/v2/everything` search over the last week, newest first.
pub struct NewsApi {
    client: reqwest::Client,
    api_key: String,
}

impl NewsApi {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    source: Option<ArticleSource>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

pub(crate) fn parse_articles(body: &str, limit: usize) -> Result<Vec<NewsItem>> {
    let env: Envelope = serde_json::from_str(body).context("decoding newsapi response")?;
    if env.status != "ok" {
        anyhow::bail!("newsapi: {}", env.message.unwrap_or(env.status));
    }
    Ok(env
        .articles
        .into_iter()
        .filter_map(|a| {
            let headline = a.title.as_deref().map(normalize_text).and_then(|t| non_empty(&t))?;
            Some(NewsItem {
                headline: Some(headline),
                summary: a
                    .description
                    .as_deref()
                    .map(normalize_text)
                    .and_then(|t| non_empty(&t)),
                source: a
                    .source
                    .and_then(|s| s.name)
                    .unwrap_or_else(|| "NewsAPI".to_string()),
                date: a
                    .published_at
                    .map(|p| p.chars().take(10).collect())
                    .unwrap_or_default(),
                url: a.url,
                ..NewsItem::default()
            })
        })
        .take(limit)
        .collect())
}

fn window(today: NaiveDate) -> (String, String) {
    let from = today - Duration::days(LOOKBACK_DAYS);
    (from.format("%Y-%m-%d").to_string(), today.format("%Y-%m-%d").to_string())
}

#[async_trait]
impl NewsSource for NewsApi {
    async fn try_fetch(&self, company_name: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let (from, to) = window(Utc::now().date_naive());
        let q = format!("{company_name} OR {}", company_name.to_lowercase());
        let page_size = limit.clamp(1, 100).to_string();
        let body = http::get_text(
            &self.client,
            EVERYTHING_URL,
            &[
                ("q", q.as_str()),
                ("language", "en"),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ],
        )
        .await?;
        parse_articles(&body, limit)
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn articles_map_to_items() {
        let body = r#"{"status":"ok","totalResults":3,"articles":[
            {"source":{"id":null,"name":"Reuters"},"title":"Acme &amp; Co beat expectations","description":"<b>Strong</b> quarter","url":"https://r/1","publishedAt":"2024-05-02T13:45:00Z"},
            {"source":{"id":null,"name":"Blog"},"title":"  ","description":"no headline","url":"https://b/2","publishedAt":"2024-05-02T10:00:00Z"},
            {"source":null,"title":"Acme updates guidance","description":null,"url":null,"publishedAt":null}
        ]}"#;
        let items = parse_articles(body, 5).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].headline.as_deref(), Some("Acme & Co beat expectations"));
        assert_eq!(items[0].summary.as_deref(), Some("Strong quarter"));
        assert_eq!(items[0].source, "Reuters");
        assert_eq!(items[0].date, "2024-05-02");
        assert!(items[0].sentiment.is_none());
        assert_eq!(items[1].source, "NewsAPI");
        assert_eq!(items[1].date, "");
    }

    #[test]
    fn error_status_is_an_error() {
        let body = r#"{"status":"error","code":"rateLimited","message":"Too many requests"}"#;
        assert!(parse_articles(body, 5).is_err());
    }

    #[test]
    fn limit_is_respected() {
        let body = r#"{"status":"ok","articles":[{"title":"a"},{"title":"b"},{"title":"c"}]}"#;
        assert_eq!(parse_articles(body, 2).unwrap().len(), 2);
    }

    #[test]
    fn seven_day_window() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(window(today), ("2024-02-27".to_string(), "2024-03-05".to_string()));
    }
}
