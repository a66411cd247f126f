use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::SymbolSource;
use crate::collectors::yahoo::YahooFinance;

/// Static name → symbol table for well-known companies.
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    pub fn new(aliases: HashMap<String, String>) -> Self {
        let aliases = aliases
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        Self { aliases }
    }

    pub fn default_seed() -> Self {
        let pairs = [
            ("microsoft", "MSFT"),
            ("apple", "AAPL"),
            ("google", "GOOGL"),
            ("amazon", "AMZN"),
            ("tesla", "TSLA"),
            ("facebook", "META"),
            ("nvidia", "NVDA"),
            ("netflix", "NFLX"),
            ("alphabet", "GOOGL"),
            ("meta", "META"),
            ("intel", "INTC"),
            ("ibm", "IBM"),
            ("oracle", "ORCL"),
            ("adobe", "ADBE"),
            ("salesforce", "CRM"),
            ("walmart", "WMT"),
            ("disney", "DIS"),
            ("coca cola", "KO"),
            ("pepsico", "PEP"),
            ("mcdonalds", "MCD"),
            ("starbucks", "SBUX"),
            ("nike", "NKE"),
            ("ford", "F"),
            ("general motors", "GM"),
            ("boeing", "BA"),
            ("lockheed martin", "LMT"),
            ("exxon mobil", "XOM"),
            ("chevron", "CVX"),
            ("bp", "BP"),
            ("shell", "SHEL"),
            ("walt disney", "DIS"),
            ("berkshire hathaway", "BRK-B"),
            ("visa", "V"),
            ("mastercard", "MA"),
            ("paypal", "PYPL"),
            ("square", "SQ"),
            ("spotify", "SPOT"),
            ("snap", "SNAP"),
            ("twitter", "TWTR"),
            ("uber", "UBER"),
            ("lyft", "LYFT"),
            ("airbnb", "ABNB"),
            ("zoom", "ZM"),
            ("peloton", "PTON"),
            ("moderna", "MRNA"),
            ("pfizer", "PFE"),
            ("johnson & johnson", "JNJ"),
            ("merck", "MRK"),
            ("novartis", "NVS"),
            ("roche", "RHHBY"),
            ("astrazeneca", "AZN"),
            ("biontech", "BNTX"),
            ("gamestop", "GME"),
            ("amc entertainment", "AMC"),
            ("blackberry", "BB"),
            ("nokia", "NOK"),
            ("amd", "AMD"),
            ("qualcomm", "QCOM"),
            ("broadcom", "AVGO"),
            ("texas instruments", "TXN"),
            ("micrsoft", "MSFT"),
            ("googl", "GOOGL"),
            ("alphabet inc", "GOOGL"),
            ("alphabet inc.", "GOOGL"),
            ("alphabet class a", "GOOGL"),
            ("alphabet class c", "GOOG"),
            ("meta platforms", "META"),
            ("meta platforms inc", "META"),
            ("meta platforms inc.", "META"),
            ("meta platforms class a", "META"),
        ];
        Self::new(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn with_aliases<I, K, V>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in extra {
            self.aliases.insert(k.into().trim().to_lowercase(), v.into());
        }
        self
    }
}

#[async_trait]
impl SymbolSource for AliasTable {
    async fn try_resolve(&self, query: &str) -> Result<Option<String>> {
        Ok(self.aliases.get(query).cloned())
    }

    fn name(&self) -> &'static str {
        "alias_table"
    }
}

/// Treats the query itself as a ticker and asks the quote endpoint.
pub struct QuoteLookup {
    yahoo: Arc<YahooFinance>,
}

impl QuoteLookup {
    pub fn new(yahoo: Arc<YahooFinance>) -> Self {
        Self { yahoo }
    }
}

#[async_trait]
impl SymbolSource for QuoteLookup {
    async fn try_resolve(&self, query: &str) -> Result<Option<String>> {
        self.yahoo.quote_symbol(query).await
    }

    fn name(&self) -> &'static str {
        "quote_lookup"
    }
}

/// First symbol listed on the public lookup page.
pub struct SearchPage {
    yahoo: Arc<YahooFinance>,
}

impl SearchPage {
    pub fn new(yahoo: Arc<YahooFinance>) -> Self {
        Self { yahoo }
    }
}

#[async_trait]
impl SymbolSource for SearchPage {
    async fn try_resolve(&self, query: &str) -> Result<Option<String>> {
        self.yahoo.search_page_symbol(query).await
    }

    fn name(&self) -> &'static str {
        "search_page"
    }
}
