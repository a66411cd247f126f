// tests/news_providers.rs
use chrono::NaiveDate;
use company_research::news::marketwatch::parse_search_page;
use company_research::news::yahoo_rss::parse_feed;

const YAHOO_XML: &str = include_str!("fixtures/yahoo_rss.xml");
const MARKETWATCH_HTML: &str = include_str!("fixtures/marketwatch_search.html");

#[test]
fn yahoo_feed_fixture_parses_into_unscored_items() {
    let items = parse_feed(YAHOO_XML, 10).expect("yahoo rss parse ok");

    assert_eq!(items.len(), 3, "blank-title item is skipped");
    assert!(items.iter().all(|i| i.source == "Yahoo Finance"));
    assert!(items.iter().all(|i| i.sentiment.is_none()));

    let first = &items[0];
    assert_eq!(
        first.headline.as_deref(),
        Some("Acme beats expectations as cloud revenue jumps")
    );
    assert_eq!(
        first.summary.as_deref(),
        Some("Acme's quarterly results topped analyst forecasts & shares rallied.")
    );
    assert_eq!(first.date, "2024-01-02");
    assert!(first
        .url
        .as_deref()
        .is_some_and(|u| u.starts_with("https://finance.yahoo.com/news/")));

    assert_eq!(items[1].summary, None, "missing description stays absent");
    assert_eq!(items[2].headline.as_deref(), Some("Acme - what analysts say before earnings"));
    assert_eq!(items[2].summary.as_deref(), Some("Three analysts weigh in."));
    assert_eq!(items[2].date, "", "unparseable pubDate leaves the date empty");
}

#[test]
fn yahoo_feed_respects_limit() {
    let items = parse_feed(YAHOO_XML, 2).expect("yahoo rss parse ok");
    assert_eq!(items.len(), 2);
    assert!(items[1].headline.as_deref().is_some_and(|h| h.contains("probe")));
}

#[test]
fn malformed_feed_is_an_error() {
    assert!(parse_feed("<html><body>Service unavailable</body>", 5).is_err());
}

#[test]
fn marketwatch_fixture_extracts_card_headlines() {
    let today = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
    let items = parse_search_page(MARKETWATCH_HTML, 10, today);

    let headlines: Vec<&str> = items.iter().filter_map(|i| i.headline.as_deref()).collect();
    assert_eq!(
        headlines,
        vec![
            "Acme shares surge on record revenue",
            "Analysts downgrade Acme after guidance cut",
            "Acme CEO on the road ahead",
        ]
    );
    assert!(items.iter().all(|i| i.source == "MarketWatch" && i.date == "2024-01-03"));
    assert_eq!(
        items[1].url.as_deref(),
        Some("https://www.marketwatch.com/story/acme-downgrade-11704300000")
    );
}

#[test]
fn marketwatch_limit_and_empty_page() {
    let today = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
    assert_eq!(parse_search_page(MARKETWATCH_HTML, 1, today).len(), 1);
    assert!(parse_search_page("<html><body>No results</body></html>", 5, today).is_empty());
}
