//! Social-media sentiment by keyword counting, one provider per platform.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::SocialPlatform;
use crate::http;
use crate::model::SentimentLabel;
use crate::text::visible_text;

static RE_POSITIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(good|great|excellent|amazing|positive|bull|bullish|higher|rise|profit|up)\b")
        .expect("positive keyword regex")
});
static RE_NEGATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(bad|terrible|awful|negative|poor|bear|bearish|lower|fall|loss|down)\b")
        .expect("negative keyword regex")
});

/// Positive when positives outnumber negatives by more than 1.5x, and the
/// other way round; Neutral otherwise (including no hits at all).
pub fn label_from_counts(positive: usize, negative: usize) -> SentimentLabel {
    let (p, n) = (positive as f64, negative as f64);
    if p > n * 1.5 {
        SentimentLabel::Positive
    } else if n > p * 1.5 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

pub fn keyword_counts(text: &str) -> (usize, usize) {
    (
        RE_POSITIVE.find_iter(text).count(),
        RE_NEGATIVE.find_iter(text).count(),
    )
}

/// Fetches a public search page and counts keywords in its visible text.
pub struct SearchPagePlatform {
    platform: &'static str,
    client: reqwest::Client,
    url: String,
    query_param: &'static str,
    extra: Vec<(&'static str, &'static str)>,
}

impl SearchPagePlatform {
    pub fn reddit(client: reqwest::Client) -> Self {
        Self {
            platform: "reddit",
            client,
            url: "https://www.reddit.com/search/".to_string(),
            query_param: "q",
            extra: vec![("sort", "top"), ("t", "month")],
        }
    }

    /// Twitter mirror search, used when no API token is configured.
    pub fn twitter_mirror(client: reqwest::Client) -> Self {
        Self {
            platform: "twitter",
            client,
            url: "https://nitter.net/search".to_string(),
            query_param: "q",
            extra: vec![("f", "tweets")],
        }
    }
}

#[async_trait]
impl SocialPlatform for SearchPagePlatform {
    fn platform(&self) -> &'static str {
        self.platform
    }

    async fn lookup_sentiment(&self, company_name: &str) -> Result<Option<SentimentLabel>> {
        let mut query: Vec<(&str, &str)> = vec![(self.query_param, company_name)];
        query.extend(self.extra.iter().copied());
        let body = http::get_text(&self.client, &self.url, &query).await?;
        let (p, n) = keyword_counts(&visible_text(&body));
        Ok(Some(label_from_counts(p, n)))
    }
}

/// Twitter recent-search API (bearer token).
pub struct TwitterApiPlatform {
    client: reqwest::Client,
    bearer: String,
}

impl TwitterApiPlatform {
    pub fn new(client: reqwest::Client, bearer: impl Into<String>) -> Self {
        Self {
            client,
            bearer: bearer.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TweetSearch {
    #[serde(default)]
    data: Vec<Tweet>,
}
#[derive(Debug, Deserialize)]
struct Tweet {
    #[serde(default)]
    text: String,
}

pub(crate) fn label_tweets(body: &str) -> Result<SentimentLabel> {
    let parsed: TweetSearch = serde_json::from_str(body)?;
    let (mut p, mut n) = (0, 0);
    for t in &parsed.data {
        let (tp, tn) = keyword_counts(&t.text);
        p += tp;
        n += tn;
    }
    Ok(label_from_counts(p, n))
}

#[async_trait]
impl SocialPlatform for TwitterApiPlatform {
    fn platform(&self) -> &'static str {
        "twitter"
    }

    async fn lookup_sentiment(&self, company_name: &str) -> Result<Option<SentimentLabel>> {
        let query = format!("{company_name} -is:retweet -is:reply");
        let resp = self
            .client
            .get("https://api.twitter.com/2/tweets/search/recent")
            .bearer_auth(&self.bearer)
            .query(&[
                ("query", query.as_str()),
                ("max_results", "100"),
                ("tweet.fields", "public_metrics,created_at"),
            ])
            .send()
            .await?
            .error_for_status()?;
        let body = resp.text().await?;
        Ok(Some(label_tweets(&body)?))
    }
}

/// Queries every platform; failing or silent platforms are left out.
pub struct SocialCollector {
    platforms: Vec<Box<dyn SocialPlatform>>,
}

impl SocialCollector {
    pub fn new(platforms: Vec<Box<dyn SocialPlatform>>) -> Self {
        Self { platforms }
    }

    pub async fn collect(&self, company_name: &str) -> BTreeMap<String, SentimentLabel> {
        let mut out = BTreeMap::new();
        for p in &self.platforms {
            match p.lookup_sentiment(company_name).await {
                Ok(Some(label)) => {
                    out.insert(p.platform().to_string(), label);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(company = %company_name, platform = p.platform(), error = %e, "social lookup failed");
                }
            }
        }
        out
    }
}
