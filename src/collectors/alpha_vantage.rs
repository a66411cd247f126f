//! Alpha Vantage adapter, used to fill fields the primary quote source missed.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::financials::{format_money, format_price};
use super::FinancialSource;
use crate::http;
use crate::model::Financials;

const BASE_URL: &str = "https://www.alphavantage.co/query";

pub struct AlphaVantage {
    client: reqwest::Client,
    api_key: String,
}

impl AlphaVantage {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    async fn query(&self, function: &str, symbol: &str) -> Result<Value> {
        let v: Value = http::get_json(
            &self.client,
            BASE_URL,
            &[
                ("function", function),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ],
        )
        .await?;
        reject_throttle(&v)?;
        Ok(v)
    }
}

#[async_trait]
impl FinancialSource for AlphaVantage {
    async fn lookup_financials(&self, symbol: &str) -> Result<Financials> {
        let overview = self.query("OVERVIEW", symbol).await?;
        let mut out = parse_overview(&overview);

        // The quote endpoint is a separate call; its failure keeps the overview.
        match self.query("GLOBAL_QUOTE", symbol).await {
            Ok(q) => out.stock_price = parse_global_quote_price(&q),
            Err(e) => tracing::debug!(%symbol, error = %e, "alpha vantage quote failed"),
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "alpha_vantage"
    }
}

/// Rate limiting and bad keys come back as 200 with a `Note`/`Information`/
/// `Error Message` field instead of data.
fn reject_throttle(v: &Value) -> Result<()> {
    for key in ["Note", "Information", "Error Message"] {
        if let Some(msg) = v.get(key).and_then(Value::as_str) {
            anyhow::bail!("alpha vantage: {msg}");
        }
    }
    Ok(())
}

fn number_field(v: &Value, key: &str) -> Option<f64> {
    v.get(key)
        .and_then(Value::as_str)
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|x| x.is_finite() && *x > 0.0)
}

pub(crate) fn parse_overview(v: &Value) -> Financials {
    Financials {
        market_cap: number_field(v, "MarketCapitalization").map(format_money),
        stock_price: None,
        annual_revenue: number_field(v, "RevenueTTM").map(format_money),
    }
}

pub(crate) fn parse_global_quote_price(v: &Value) -> Option<String> {
    v.get("Global Quote")
        .and_then(|q| number_field(q, "05. price"))
        .map(format_price)
}
