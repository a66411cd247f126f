//! External-source adapters feeding the orchestrator.
//!
//! Each trait is one collaborator capability. Implementations return
//! `anyhow::Result`; turning an error into an empty field is the caller's
//! job, never the adapter's.

pub mod alpha_vantage;
pub mod competitors;
pub mod financials;
pub mod social;
pub mod wikipedia;
pub mod yahoo;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{CompetitorInfo, Financials, PriceBar, Profile, SentimentLabel};

#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// `Ok(None)` when the source has no page for the company.
    async fn lookup_profile(&self, company_name: &str) -> Result<Option<Profile>>;
}

#[async_trait]
pub trait FinancialSource: Send + Sync {
    async fn lookup_financials(&self, symbol: &str) -> Result<Financials>;
    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait SocialPlatform: Send + Sync {
    /// Platform key in the record's social-sentiment map.
    fn platform(&self) -> &'static str;
    async fn lookup_sentiment(&self, company_name: &str) -> Result<Option<SentimentLabel>>;
}

#[async_trait]
pub trait CompetitorSource: Send + Sync {
    async fn lookup_competitors(&self, company_name: &str, limit: usize) -> Result<Vec<String>>;
    async fn lookup_details(&self, competitor_name: &str) -> Result<CompetitorInfo>;
    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    /// Daily bars over `period` (`1mo`, `6mo`, `1y`, ...), oldest first.
    async fn history(&self, symbol: &str, period: &str) -> Result<Vec<PriceBar>>;
}
