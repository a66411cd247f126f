//! Competitor discovery and per-competitor details.
//!
//! Names come from the first source in the chain that returns any; the
//! static map is the usual last, low-confidence entry.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::{CompetitorSource, FinancialSource};
use crate::http;
use crate::model::CompetitorInfo;
use crate::resolve::InstrumentResolver;

const CRUNCHBASE_URL: &str = "https://api.crunchbase.com/api/v4/entities/organizations";

pub struct Crunchbase {
    client: reqwest::Client,
    api_key: String,
}

impl Crunchbase {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    async fn organization_uuid(&self, name: &str) -> Result<Option<String>> {
        let v: Value = http::get_json(
            &self.client,
            CRUNCHBASE_URL,
            &[
                ("query", name),
                ("field_ids", "name,identifier"),
                ("card_ids", "identifier"),
                ("user_key", self.api_key.as_str()),
            ],
        )
        .await?;
        Ok(parse_first_uuid(&v))
    }
}

pub(crate) fn parse_first_uuid(v: &Value) -> Option<String> {
    v.pointer("/data/cards")
        .and_then(Value::as_array)
        .and_then(|cards| cards.first())
        .and_then(|c| c.pointer("/identifier/uuid"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

pub(crate) fn parse_competitor_names(v: &Value, limit: usize) -> Vec<String> {
    v.pointer("/data/cards")
        .and_then(Value::as_array)
        .map(|cards| {
            cards
                .iter()
                .filter_map(|c| c.pointer("/properties/name").and_then(Value::as_str))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn parse_details(name: &str, v: &Value) -> CompetitorInfo {
    let props = v.get("properties").unwrap_or(&Value::Null);
    CompetitorInfo {
        name: Some(name.to_string()),
        market_cap: None,
        employees: props
            .get("num_employees_enum")
            .and_then(Value::as_str)
            .map(str::to_string),
        industry: props
            .get("categories")
            .and_then(Value::as_array)
            .and_then(|c| c.first())
            .and_then(|c| c.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

#[async_trait]
impl CompetitorSource for Crunchbase {
    async fn lookup_competitors(&self, company_name: &str, limit: usize) -> Result<Vec<String>> {
        let Some(uuid) = self.organization_uuid(company_name).await? else {
            return Ok(Vec::new());
        };
        let url = format!("{CRUNCHBASE_URL}/{uuid}/relationships");
        let v: Value = http::get_json(
            &self.client,
            &url,
            &[("card_ids", "competitors"), ("user_key", self.api_key.as_str())],
        )
        .await?;
        Ok(parse_competitor_names(&v, limit))
    }

    async fn lookup_details(&self, competitor_name: &str) -> Result<CompetitorInfo> {
        let uuid = self
            .organization_uuid(competitor_name)
            .await?
            .with_context(|| format!("no organization for {competitor_name}"))?;
        let url = format!("{CRUNCHBASE_URL}/{uuid}");
        let v: Value = http::get_json(
            &self.client,
            &url,
            &[
                ("field_ids", "name,short_description,num_employees_enum,categories"),
                ("user_key", self.api_key.as_str()),
            ],
        )
        .await?;
        Ok(parse_details(competitor_name, &v))
    }

    fn name(&self) -> &'static str {
        "crunchbase"
    }
}

/// Curated company → competitors map for well-known names.
pub struct StaticCompetitorMap {
    map: HashMap<String, Vec<String>>,
}

impl StaticCompetitorMap {
    pub fn new(map: HashMap<String, Vec<String>>) -> Self {
        let map = map
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        Self { map }
    }

    pub fn default_seed() -> Self {
        let mut map = HashMap::new();
        for (k, v) in [
            ("microsoft", &["Apple", "Google", "Amazon", "IBM"][..]),
            ("apple", &["Samsung", "Google", "Microsoft", "Huawei"]),
            ("amazon", &["Walmart", "Alibaba", "Microsoft", "Google"]),
            ("google", &["Microsoft", "Apple", "Facebook", "Amazon"]),
            ("alphabet", &["Microsoft", "Apple", "Meta", "Amazon"]),
            ("meta", &["Snap", "TikTok", "LinkedIn", "Twitter"]),
            ("facebook", &["Snap", "TikTok", "LinkedIn", "Twitter"]),
            ("netflix", &["Disney+", "Amazon Prime", "Hulu", "HBO Max"]),
            ("tesla", &["Ford", "General Motors", "Toyota", "Volkswagen"]),
            ("nvidia", &["AMD", "Intel", "Qualcomm", "ARM"]),
            ("ibm", &["Microsoft", "Oracle", "SAP", "Amazon"]),
            ("oracle", &["SAP", "Microsoft", "IBM", "Salesforce"]),
        ] {
            map.insert(k.to_string(), v.iter().map(|s| s.to_string()).collect());
        }
        Self { map }
    }
}

#[async_trait]
impl CompetitorSource for StaticCompetitorMap {
    async fn lookup_competitors(&self, company_name: &str, limit: usize) -> Result<Vec<String>> {
        let key = company_name.trim().to_lowercase();
        Ok(self
            .map
            .get(&key)
            .map(|v| v.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn lookup_details(&self, competitor_name: &str) -> Result<CompetitorInfo> {
        Ok(CompetitorInfo::named(competitor_name))
    }

    fn name(&self) -> &'static str {
        "static_map"
    }
}

/// Fills competitor market caps via symbol resolution + a financial source.
pub struct MarketCapEnricher {
    pub resolver: Arc<InstrumentResolver>,
    pub financials: Arc<dyn FinancialSource>,
}

pub struct CompetitorCollector {
    sources: Vec<Box<dyn CompetitorSource>>,
    details: Option<Box<dyn CompetitorSource>>,
    market_caps: Option<MarketCapEnricher>,
}

impl CompetitorCollector {
    pub fn new(sources: Vec<Box<dyn CompetitorSource>>) -> Self {
        Self {
            sources,
            details: None,
            market_caps: None,
        }
    }

    /// Details come from `details` instead of the source that named the competitor.
    pub fn with_details(mut self, details: Box<dyn CompetitorSource>) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_market_caps(mut self, enricher: MarketCapEnricher) -> Self {
        self.market_caps = Some(enricher);
        self
    }

    pub async fn collect(&self, company_name: &str, limit: usize) -> Vec<CompetitorInfo> {
        let mut names = Vec::new();
        let mut named_by: Option<&dyn CompetitorSource> = None;
        for src in &self.sources {
            match src.lookup_competitors(company_name, limit).await {
                Ok(v) if !v.is_empty() => {
                    names = v;
                    named_by = Some(src.as_ref());
                    break;
                }
                Ok(_) => tracing::debug!(company = %company_name, source = src.name(), "no competitors"),
                Err(e) => {
                    tracing::warn!(company = %company_name, source = src.name(), error = %e, "competitor source failed")
                }
            }
        }
        let Some(named_by) = named_by else {
            return Vec::new();
        };
        let details = self.details.as_deref().unwrap_or(named_by);

        let mut out = Vec::with_capacity(names.len());
        for name in names.into_iter().take(limit) {
            if name.trim().is_empty() {
                continue;
            }
            let mut info = match details.lookup_details(&name).await {
                Ok(info) => info,
                Err(e) => {
                    tracing::debug!(competitor = %name, error = %e, "competitor details failed");
                    CompetitorInfo::named(&name)
                }
            };
            if info.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
                info.name = Some(name.clone());
            }
            if info.market_cap.is_none() {
                info.market_cap = self.market_cap_for(&name).await;
            }
            out.push(info);
        }
        out
    }

    async fn market_cap_for(&self, name: &str) -> Option<String> {
        let e = self.market_caps.as_ref()?;
        let symbol = e.resolver.resolve(name).await?;
        match e.financials.lookup_financials(&symbol).await {
            Ok(f) => f.market_cap,
            Err(err) => {
                tracing::debug!(competitor = %name, %symbol, error = %err, "competitor market cap failed");
                None
            }
        }
    }
}
