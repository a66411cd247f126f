//! Yahoo Finance adapter: quote lookup, quote summary, search page and
//! daily chart history.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::financials::{format_money, format_price};
use super::{FinancialSource, PriceHistorySource};
use crate::http;
use crate::model::{Financials, PriceBar};

const QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const LOOKUP_URL: &str = "https://finance.yahoo.com/lookup";

static RE_DATA_SYMBOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"data-symbol="([^"]+)""#).expect("data-symbol regex"));

#[derive(Debug, Clone)]
pub struct YahooFinance {
    client: reqwest::Client,
}

impl YahooFinance {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Treat `query` as a ticker and return the symbol Yahoo reports for it.
    pub async fn quote_symbol(&self, query: &str) -> Result<Option<String>> {
        let body = http::get_text(&self.client, QUOTE_URL, &[("symbols", query)]).await?;
        parse_quote_symbol(&body)
    }

    /// First `data-symbol` attribute on the lookup page for `query`.
    pub async fn search_page_symbol(&self, query: &str) -> Result<Option<String>> {
        let body = http::get_text(&self.client, LOOKUP_URL, &[("s", query)]).await?;
        Ok(parse_lookup_page(&body))
    }

    pub async fn quote_summary(&self, symbol: &str) -> Result<Financials> {
        let url = format!("{SUMMARY_URL}/{symbol}");
        let body = http::get_text(&self.client, &url, &[("modules", "price,financialData")]).await?;
        parse_quote_summary(&body)
    }

    pub async fn chart(&self, symbol: &str, range: &str) -> Result<Vec<PriceBar>> {
        let url = format!("{CHART_URL}/{symbol}");
        let body =
            http::get_text(&self.client, &url, &[("range", range), ("interval", "1d")]).await?;
        parse_chart(&body)
    }
}

#[async_trait]
impl FinancialSource for YahooFinance {
    async fn lookup_financials(&self, symbol: &str) -> Result<Financials> {
        self.quote_summary(symbol).await
    }

    fn name(&self) -> &'static str {
        "yahoo_finance"
    }
}

#[async_trait]
impl PriceHistorySource for YahooFinance {
    async fn history(&self, symbol: &str, period: &str) -> Result<Vec<PriceBar>> {
        self.chart(symbol, period).await
    }
}

#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteResponse,
}
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<QuoteRow>,
}
#[derive(Debug, Deserialize)]
struct QuoteRow {
    symbol: Option<String>,
}

pub(crate) fn parse_quote_symbol(body: &str) -> Result<Option<String>> {
    let env: QuoteEnvelope = serde_json::from_str(body).context("decoding quote response")?;
    Ok(env
        .quote_response
        .result
        .into_iter()
        .filter_map(|r| r.symbol)
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty()))
}

pub(crate) fn parse_lookup_page(html: &str) -> Option<String> {
    RE_DATA_SYMBOL
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .find(|s| !s.is_empty())
}

#[derive(Debug, Deserialize)]
struct SummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryBody,
}
#[derive(Debug, Deserialize)]
struct SummaryBody {
    #[serde(default)]
    result: Vec<SummaryResult>,
}
#[derive(Debug, Default, Deserialize)]
struct SummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(rename = "financialData", default)]
    financial_data: Option<FinancialDataModule>,
}
#[derive(Debug, Default, Deserialize)]
struct PriceModule {
    #[serde(rename = "marketCap", default)]
    market_cap: Option<RawValue>,
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<RawValue>,
}
#[derive(Debug, Default, Deserialize)]
struct FinancialDataModule {
    #[serde(rename = "currentPrice", default)]
    current_price: Option<RawValue>,
    #[serde(rename = "totalRevenue", default)]
    total_revenue: Option<RawValue>,
}
/// Yahoo wraps numbers as `{"raw": 1.0, "fmt": "1.00"}`; empty objects mean absent.
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

fn raw(v: &Option<RawValue>) -> Option<f64> {
    v.as_ref().and_then(|r| r.raw).filter(|x| x.is_finite() && *x > 0.0)
}

pub(crate) fn parse_quote_summary(body: &str) -> Result<Financials> {
    let env: SummaryEnvelope = serde_json::from_str(body).context("decoding quote summary")?;
    let r = env
        .quote_summary
        .result
        .into_iter()
        .next()
        .context("quote summary has no result")?;
    let price = r.price.unwrap_or_default();
    let fin = r.financial_data.unwrap_or_default();

    Ok(Financials {
        market_cap: raw(&price.market_cap).map(format_money),
        stock_price: raw(&fin.current_price)
            .or_else(|| raw(&price.regular_market_price))
            .map(format_price),
        annual_revenue: raw(&fin.total_revenue).map(format_money),
    })
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}
#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}
#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}
#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}
#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Daily bars in timestamp order. Bars with any missing field are skipped.
pub(crate) fn parse_chart(body: &str) -> Result<Vec<PriceBar>> {
    let env: ChartEnvelope = serde_json::from_str(body).context("decoding chart response")?;
    let Some(r) = env.chart.result.and_then(|v| v.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let q = r.indicators.quote.into_iter().next().unwrap_or_default();

    let at = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();
    let mut bars = Vec::with_capacity(r.timestamp.len());
    for (i, ts) in r.timestamp.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(*ts, 0).map(|d| d.date_naive()) else {
            continue;
        };
        let (Some(open), Some(high), Some(low), Some(close)) =
            (at(&q.open, i), at(&q.high, i), at(&q.low, i), at(&q.close, i))
        else {
            continue;
        };
        bars.push(PriceBar {
            date,
            open,
            high,
            low,
            close,
        });
    }
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}
