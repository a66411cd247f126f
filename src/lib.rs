// src/lib.rs
// Public library surface for the CLI and integration tests.

pub mod collectors;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod model;
pub mod news;
pub mod orchestrator;
pub mod resolve;
pub mod sentiment;
pub mod storage;
pub mod text;
pub mod trend;

// ---- Re-exports for stable public API ----
pub use crate::config::{ApiKeys, ResearchConfig};
pub use crate::error::ResearchError;
pub use crate::model::{
    CompetitorInfo, Confidence, Financials, Forecast, NewsItem, OverallSentiment, PriceBar,
    Profile, ResearchRecord, SentimentLabel, TrendLabel, TrendResult,
};
pub use crate::orchestrator::{Collaborators, ResearchOrchestrator};
