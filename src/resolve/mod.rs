//! # Instrument Resolver
//! Free-text company name → canonical trading symbol via an ordered list of
//! strategies, short-circuiting on the first hit.
//!
//! A strategy that errors is logged and skipped; the resolver itself never
//! fails and returns `None` once every strategy came up empty.

pub mod sources;

use anyhow::Result;
use async_trait::async_trait;
use metrics::counter;

pub use sources::{AliasTable, QuoteLookup, SearchPage};

/// One way of answering "which symbol is this company?".
#[async_trait]
pub trait SymbolSource: Send + Sync {
    /// `query` is already trimmed, lower-cased and stripped of a leading `$`.
    async fn try_resolve(&self, query: &str) -> Result<Option<String>>;
    fn name(&self) -> &'static str;
}

pub struct InstrumentResolver {
    sources: Vec<Box<dyn SymbolSource>>,
}

impl InstrumentResolver {
    pub fn new(sources: Vec<Box<dyn SymbolSource>>) -> Self {
        Self { sources }
    }

    /// Alias table only; useful offline.
    pub fn offline() -> Self {
        Self::new(vec![Box::new(AliasTable::default_seed())])
    }

    pub async fn resolve(&self, company_name: &str) -> Option<String> {
        let query = normalize_query(company_name)?;

        for src in &self.sources {
            match src.try_resolve(&query).await {
                Ok(Some(symbol)) => {
                    let symbol = symbol.trim().to_ascii_uppercase();
                    if symbol.is_empty() {
                        continue;
                    }
                    tracing::debug!(query = %query, source = src.name(), %symbol, "symbol resolved");
                    return Some(symbol);
                }
                Ok(None) => {
                    tracing::debug!(query = %query, source = src.name(), "no symbol from source");
                }
                Err(e) => {
                    tracing::warn!(query = %query, source = src.name(), error = %e, "symbol source failed");
                    counter!("resolver_step_failures_total", "source" => src.name()).increment(1);
                }
            }
        }
        tracing::info!(query = %query, "symbol unresolved after all sources");
        None
    }
}

/// Trim, drop a leading `$` ticker marker, lower-case. `None` when blank.
pub fn normalize_query(name: &str) -> Option<String> {
    let q = name.trim().trim_start_matches('$').trim().to_lowercase();
    if q.is_empty() {
        None
    } else {
        Some(q)
    }
}
