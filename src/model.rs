//! # Research Model
//! Plain data carried between collectors, analyzers and the store.
//!
//! Every sub-field of [`ResearchRecord`] is independently optional, so a
//! record can always be produced even when every upstream source fails.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Three-way polarity label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        };
        f.write_str(s)
    }
}

/// How strongly a score supports its label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Integer weight used by the sentiment aggregator.
    pub fn weight(self) -> u32 {
        match self {
            Confidence::Low => 1,
            Confidence::Medium => 2,
            Confidence::High => 3,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
        };
        f.write_str(s)
    }
}

/// Structured facts about the company itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Canonical name as reported by the profile source (page title).
    pub company_name: Option<String>,
    pub headquarters: Option<String>,
    pub founded: Option<i32>,
    pub industry: Option<String>,
    pub ceo: Option<String>,
    pub employees: Option<u64>,
}

impl Profile {
    pub fn is_empty(&self) -> bool {
        self.headquarters.is_none()
            && self.founded.is_none()
            && self.industry.is_none()
            && self.ceo.is_none()
            && self.employees.is_none()
    }
}

/// Headline financials, already normalized to currency-scale strings
/// (e.g. `"$2.43 billion"`, `"$187.20"`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Financials {
    pub market_cap: Option<String>,
    pub stock_price: Option<String>,
    pub annual_revenue: Option<String>,
}

impl Financials {
    pub fn is_empty(&self) -> bool {
        self.market_cap.is_none() && self.stock_price.is_none() && self.annual_revenue.is_none()
    }

    /// Fill fields that are still `None` from `other`; present fields win.
    pub fn fill_missing_from(&mut self, other: Financials) {
        if self.market_cap.is_none() {
            self.market_cap = other.market_cap;
        }
        if self.stock_price.is_none() {
            self.stock_price = other.stock_price;
        }
        if self.annual_revenue.is_none() {
            self.annual_revenue = other.annual_revenue;
        }
    }
}

/// One news article. Source adapters create it with the sentiment fields
/// unset; the sentiment scorer returns an enriched copy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewsItem {
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub source: String,
    /// `YYYY-MM-DD`; empty when the source reported no date.
    pub date: String,
    pub url: Option<String>,
    pub sentiment: Option<SentimentLabel>,
    pub sentiment_score: Option<f64>,
    pub sentiment_confidence: Option<Confidence>,
}

impl NewsItem {
    pub fn new(headline: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            headline: Some(headline.into()),
            source: source.into(),
            ..Self::default()
        }
    }

    /// Text that gets scored: headline and summary joined by a period,
    /// headline first. `None` when neither carries any text.
    pub fn scoring_text(&self) -> Option<String> {
        let headline = self.headline.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let summary = self.summary.as_deref().map(str::trim).filter(|s| !s.is_empty());
        match (headline, summary) {
            (Some(h), Some(s)) => Some(format!("{h}. {s}")),
            (Some(h), None) => Some(h.to_string()),
            (None, Some(s)) => Some(s.to_string()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompetitorInfo {
    pub name: Option<String>,
    pub market_cap: Option<String>,
    pub employees: Option<String>,
    pub industry: Option<String>,
}

impl CompetitorInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// One daily bar of a price history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Five-bucket trend classification over a growth percentage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrendLabel {
    #[serde(rename = "Strong Growth")]
    StrongGrowth,
    #[serde(rename = "Moderate Growth")]
    ModerateGrowth,
    Stable,
    #[serde(rename = "Moderate Decline")]
    ModerateDecline,
    #[serde(rename = "Strong Decline")]
    StrongDecline,
}

impl TrendLabel {
    /// Boundaries: `>=10` strong growth, `[3,10)` moderate growth,
    /// `[-3,3)` stable, `[-10,-3)` moderate decline, `<-10` strong decline.
    pub fn classify(growth_pct: f64) -> Self {
        if growth_pct >= 10.0 {
            TrendLabel::StrongGrowth
        } else if growth_pct >= 3.0 {
            TrendLabel::ModerateGrowth
        } else if growth_pct >= -3.0 {
            TrendLabel::Stable
        } else if growth_pct >= -10.0 {
            TrendLabel::ModerateDecline
        } else {
            TrendLabel::StrongDecline
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendLabel::StrongGrowth => "Strong Growth",
            TrendLabel::ModerateGrowth => "Moderate Growth",
            TrendLabel::Stable => "Stable",
            TrendLabel::ModerateDecline => "Moderate Decline",
            TrendLabel::StrongDecline => "Strong Decline",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Forecast {
    pub current_price: f64,
    pub forecast_price: f64,
    pub forecast_change_percent: f64,
    pub horizon_days: u32,
    /// Always [`Confidence::Low`]: the model is a plain linear extrapolation.
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendResult {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_price: f64,
    pub end_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub growth_percentage: f64,
    /// Standard deviation of day-over-day returns, in percent.
    pub volatility: f64,
    pub trend: TrendLabel,
    pub forecast: Option<Forecast>,
}

/// Confidence-weighted summary over a set of scored news items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverallSentiment {
    pub label: SentimentLabel,
    pub score: f64,
    pub confidence: Confidence,
    pub article_count: usize,
    pub positive_count: usize,
    pub neutral_count: usize,
    pub negative_count: usize,
}

impl Default for OverallSentiment {
    fn default() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
            confidence: Confidence::Low,
            article_count: 0,
            positive_count: 0,
            neutral_count: 0,
            negative_count: 0,
        }
    }
}

/// The consolidated research result for one company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchRecord {
    pub company_name: String,
    pub profile: Option<Profile>,
    pub financials: Option<Financials>,
    pub news: Vec<NewsItem>,
    #[serde(default)]
    pub news_sentiment: OverallSentiment,
    pub social_sentiment: BTreeMap<String, SentimentLabel>,
    pub competitors: Vec<CompetitorInfo>,
    pub growth_trend: Option<TrendResult>,
    pub created_at: DateTime<Utc>,
}

impl ResearchRecord {
    /// A record with every sub-field at its failure default.
    pub fn empty(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            profile: None,
            financials: None,
            news: Vec::new(),
            news_sentiment: OverallSentiment::default(),
            social_sentiment: BTreeMap::new(),
            competitors: Vec::new(),
            growth_trend: None,
            created_at: Utc::now(),
        }
    }
}

/// Round to two decimal places.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
