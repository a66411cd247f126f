//! Runtime configuration: tuning knobs from a TOML/JSON file and API keys
//! from the environment.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CONFIG_PATH: &str = "RESEARCH_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/research.toml";
pub const DEFAULT_JSON_PATH: &str = "config/research.json";

fn default_news_quota() -> usize {
    5
}
fn default_competitor_limit() -> usize {
    3
}
fn default_trend_period() -> String {
    "1y".to_string()
}
fn default_forecast_horizon_days() -> u32 {
    30
}
fn default_http_timeout_secs() -> u64 {
    10
}
fn default_stage_timeout_secs() -> u64 {
    20
}
fn default_deadline_secs() -> u64 {
    45
}
fn default_max_concurrency() -> usize {
    4
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchConfig {
    /// Upper bound on news items per company.
    #[serde(default = "default_news_quota")]
    pub news_quota: usize,
    #[serde(default = "default_competitor_limit")]
    pub competitor_limit: usize,
    /// Lookback passed to the price-history source (`1mo`, `6mo`, `1y`, ...).
    #[serde(default = "default_trend_period")]
    pub trend_period: String,
    #[serde(default = "default_forecast_horizon_days")]
    pub forecast_horizon_days: u32,
    /// Hard per-request timeout for every outbound HTTP call.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// Budget for one orchestrator stage, including its fallbacks.
    #[serde(default = "default_stage_timeout_secs")]
    pub stage_timeout_secs: u64,
    /// Budget for the whole research request.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    /// Stages allowed in flight at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Drop news items whose headline or URL was already collected.
    #[serde(default)]
    pub dedupe_news: bool,
    /// Directory for the JSON-file store; `None` keeps records in memory.
    #[serde(default)]
    pub store_dir: Option<PathBuf>,
    /// Replacement for the embedded domain-term table.
    #[serde(default)]
    pub domain_terms_path: Option<PathBuf>,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            news_quota: default_news_quota(),
            competitor_limit: default_competitor_limit(),
            trend_period: default_trend_period(),
            forecast_horizon_days: default_forecast_horizon_days(),
            http_timeout_secs: default_http_timeout_secs(),
            stage_timeout_secs: default_stage_timeout_secs(),
            deadline_secs: default_deadline_secs(),
            max_concurrency: default_max_concurrency(),
            dedupe_news: false,
            store_dir: None,
            domain_terms_path: None,
        }
    }
}

impl ResearchConfig {
    /// Load from an explicit path. TOML or JSON, chosen by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading research config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: ResearchConfig = match ext.as_str() {
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?,
            _ => toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?,
        };
        Ok(cfg.sanitized())
    }

    /// Load using env var + fallbacks:
    /// 1) $RESEARCH_CONFIG_PATH
    /// 2) config/research.toml
    /// 3) config/research.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        for p in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        Ok(Self::default())
    }

    /// Replace zero or blank values with defaults.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        if self.news_quota == 0 {
            self.news_quota = d.news_quota;
        }
        if self.competitor_limit == 0 {
            self.competitor_limit = d.competitor_limit;
        }
        if self.trend_period.trim().is_empty() {
            self.trend_period = d.trend_period;
        }
        if self.forecast_horizon_days == 0 {
            self.forecast_horizon_days = d.forecast_horizon_days;
        }
        if self.http_timeout_secs == 0 {
            self.http_timeout_secs = d.http_timeout_secs;
        }
        if self.stage_timeout_secs == 0 {
            self.stage_timeout_secs = d.stage_timeout_secs;
        }
        if self.deadline_secs == 0 {
            self.deadline_secs = d.deadline_secs;
        }
        if self.max_concurrency == 0 {
            self.max_concurrency = d.max_concurrency;
        }
        self
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

/// Credentials for the keyed upstream APIs. Absent keys disable the
/// corresponding source rather than failing startup.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub news_api: Option<String>,
    pub alpha_vantage: Option<String>,
    pub crunchbase: Option<String>,
    pub twitter_bearer: Option<String>,
}

impl ApiKeys {
    pub fn from_env() -> Self {
        Self {
            news_api: env_key("NEWS_API_KEY"),
            alpha_vantage: env_key("ALPHA_VANTAGE_API_KEY"),
            crunchbase: env_key("CRUNCHBASE_API_KEY"),
            twitter_bearer: env_key("TWITTER_BEARER_TOKEN"),
        }
    }
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: ResearchConfig = toml::from_str("news_quota = 8").unwrap();
        assert_eq!(cfg.news_quota, 8);
        assert_eq!(cfg.competitor_limit, 3);
        assert_eq!(cfg.trend_period, "1y");
        assert!(!cfg.dedupe_news);
    }

    #[test]
    fn zero_values_are_sanitized() {
        let cfg = ResearchConfig {
            news_quota: 0,
            max_concurrency: 0,
            deadline_secs: 0,
            trend_period: "  ".into(),
            ..ResearchConfig::default()
        }
        .sanitized();
        assert_eq!(cfg, ResearchConfig::default());
    }

    #[test]
    fn json_files_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("research.json");
        fs::write(&p, r#"{"news_quota": 2, "dedupe_news": true}"#).unwrap();
        let cfg = ResearchConfig::load_from(&p).unwrap();
        assert_eq!(cfg.news_quota, 2);
        assert!(cfg.dedupe_news);
    }
}
