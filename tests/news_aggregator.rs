// tests/news_aggregator.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use company_research::model::{Confidence, NewsItem, SentimentLabel};
use company_research::news::{NewsAggregator, NewsSource};

/// Returns `count` items named `<prefix> <n>`, honouring the limit, and
/// remembers the limits it was asked for.
struct Canned {
    prefix: &'static str,
    count: usize,
    asked: Arc<std::sync::Mutex<Vec<usize>>>,
}

impl Canned {
    fn new(prefix: &'static str, count: usize) -> Self {
        Self {
            prefix,
            count,
            asked: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl NewsSource for Canned {
    async fn try_fetch(&self, _company: &str, limit: usize) -> Result<Vec<NewsItem>> {
        self.asked.lock().unwrap().push(limit);
        Ok((0..self.count.min(limit))
            .map(|n| NewsItem {
                url: Some(format!("https://{}.test/{n}", self.prefix)),
                date: "2024-01-02".into(),
                ..NewsItem::new(format!("{} {n}", self.prefix), self.prefix)
            })
            .collect())
    }
    fn name(&self) -> &'static str {
        self.prefix
    }
}

struct Broken(Arc<AtomicUsize>);

#[async_trait]
impl NewsSource for Broken {
    async fn try_fetch(&self, _company: &str, _limit: usize) -> Result<Vec<NewsItem>> {
        self.0.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("HTTP 503")
    }
    fn name(&self) -> &'static str {
        "broken"
    }
}

/// Ignores the limit entirely.
struct Flood;

#[async_trait]
impl NewsSource for Flood {
    async fn try_fetch(&self, _company: &str, _limit: usize) -> Result<Vec<NewsItem>> {
        Ok((0..50)
            .map(|n| {
                let mut it = NewsItem::new(format!("flood {n}"), "flood");
                // Pre-filled sentiment must not leak through.
                it.sentiment = Some(SentimentLabel::Positive);
                it.sentiment_score = Some(0.9);
                it.sentiment_confidence = Some(Confidence::High);
                it
            })
            .collect())
    }
    fn name(&self) -> &'static str {
        "flood"
    }
}

/// Repeats one headline under a fresh URL each time.
struct Echo(&'static str);

#[async_trait]
impl NewsSource for Echo {
    async fn try_fetch(&self, _company: &str, limit: usize) -> Result<Vec<NewsItem>> {
        Ok((0..limit)
            .map(|n| NewsItem {
                url: Some(format!("https://{}.test/{n}", self.0)),
                ..NewsItem::new("Acme Soars On Earnings", self.0)
            })
            .collect())
    }
    fn name(&self) -> &'static str {
        self.0
    }
}

#[tokio::test]
async fn sources_are_asked_for_the_remaining_quota_in_priority_order() {
    let primary = Canned::new("primary", 2);
    let secondary = Canned::new("secondary", 10);
    let tertiary = Canned::new("tertiary", 10);
    let asked_secondary = secondary.asked.clone();
    let asked_tertiary = tertiary.asked.clone();

    let agg = NewsAggregator::new(vec![Box::new(primary), Box::new(secondary), Box::new(tertiary)]);
    let items = agg.collect("Acme", 5).await;

    assert_eq!(items.len(), 5);
    assert_eq!(items[0].source, "primary");
    assert_eq!(items[1].source, "primary");
    assert!(items[2..].iter().all(|i| i.source == "secondary"));
    assert_eq!(asked_secondary.lock().unwrap().as_slice(), [3]);
    assert!(
        asked_tertiary.lock().unwrap().is_empty(),
        "quota met, later sources are not asked"
    );
}

#[tokio::test]
async fn failures_are_skipped_and_never_abort() {
    let calls = Arc::new(AtomicUsize::new(0));
    let agg = NewsAggregator::new(vec![
        Box::new(Broken(calls.clone())),
        Box::new(Canned::new("empty", 0)),
        Box::new(Canned::new("backup", 3)),
    ]);
    let items = agg.collect("Acme", 5).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(items.len(), 3, "fewer than quota is fine");
    assert!(items.iter().all(|i| i.source == "backup"));
}

#[tokio::test]
async fn all_sources_failing_yields_empty() {
    let calls = Arc::new(AtomicUsize::new(0));
    let agg = NewsAggregator::new(vec![Box::new(Broken(calls.clone())), Box::new(Broken(calls.clone()))]);
    assert!(agg.collect("Acme", 5).await.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn quota_holds_even_when_a_source_overdelivers() {
    let agg = NewsAggregator::new(vec![Box::new(Flood)]);
    let items = agg.collect("Acme", 4).await;
    assert_eq!(items.len(), 4);
    assert!(items.iter().all(|i| i.sentiment.is_none()
        && i.sentiment_score.is_none()
        && i.sentiment_confidence.is_none()));
}

#[tokio::test]
async fn zero_quota_asks_nobody() {
    let source = Canned::new("only", 5);
    let asked = source.asked.clone();
    let agg = NewsAggregator::new(vec![Box::new(source)]);
    assert!(agg.collect("Acme", 0).await.is_empty());
    assert!(asked.lock().unwrap().is_empty());
}

#[tokio::test]
async fn duplicates_are_kept_unless_dedupe_is_enabled() {
    let plain = NewsAggregator::new(vec![Box::new(Echo("a")), Box::new(Echo("b"))]);
    let items = plain.collect("Acme", 4).await;
    assert_eq!(items.len(), 4);
    assert!(items.iter().all(|i| i.headline.as_deref() == Some("Acme Soars On Earnings")));

    let deduped = NewsAggregator::new(vec![
        Box::new(Echo("a")),
        Box::new(Echo("b")),
        Box::new(Canned::new("fresh", 5)),
    ])
    .with_dedupe(true);
    let items = deduped.collect("Acme", 4).await;
    assert_eq!(items.len(), 4, "dropped duplicates do not count toward the quota");
    assert_eq!(items[0].source, "a");
    assert!(items[1..].iter().all(|i| i.source == "fresh"));
}
