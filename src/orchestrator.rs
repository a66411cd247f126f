//! # Research Orchestrator
//! Fans out to every collector, downgrades each branch's failure to its
//! empty default, assembles the record and persists it.
//!
//! Branches run concurrently under a semaphore. Every stage is bounded by
//! `stage_timeout` and by what is left of the request deadline; a stage
//! that errors or runs out of time yields `T::default()`.
//!
//! The symbol for the input name is resolved at most once per request and
//! shared by the financial branch and, when the profile's canonical name is
//! the same company name, by the trend branch.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use metrics::{counter, histogram};
use tokio::sync::{OnceCell, Semaphore};
use tokio::time::{timeout_at, Instant};

use crate::collectors::alpha_vantage::AlphaVantage;
use crate::collectors::competitors::{
    CompetitorCollector, Crunchbase, MarketCapEnricher, StaticCompetitorMap,
};
use crate::collectors::financials::MergedFinancials;
use crate::collectors::social::{SearchPagePlatform, SocialCollector, TwitterApiPlatform};
use crate::collectors::wikipedia::WikipediaProfile;
use crate::collectors::yahoo::YahooFinance;
use crate::collectors::{CompetitorSource, FinancialSource, ProfileSource, SocialPlatform};
use crate::config::{ApiKeys, ResearchConfig};
use crate::error::ResearchError;
use crate::http;
use crate::model::{Financials, NewsItem, ResearchRecord, TrendResult};
use crate::news::{MarketWatch, NewsAggregator, NewsApi, NewsSource, YahooRss};
use crate::resolve::{AliasTable, InstrumentResolver, QuoteLookup, SearchPage, SymbolSource};
use crate::sentiment::{aggregate, Lexicon, SentimentScorer};
use crate::storage::{store_key, JsonFileStore, MemoryStore, ResearchStore};
use crate::trend::TrendAnalyzer;

/// Everything the orchestrator talks to.
pub struct Collaborators {
    pub profile: Arc<dyn ProfileSource>,
    pub resolver: Arc<InstrumentResolver>,
    pub financials: Arc<dyn FinancialSource>,
    pub news: Arc<NewsAggregator>,
    pub scorer: SentimentScorer,
    pub social: Arc<SocialCollector>,
    pub competitors: Arc<CompetitorCollector>,
    pub trend: Arc<TrendAnalyzer>,
    pub store: Arc<dyn ResearchStore>,
}

impl Collaborators {
    /// Production wiring: live adapters, keyed sources only when their key
    /// is present.
    pub fn live(cfg: &ResearchConfig, keys: &ApiKeys) -> Result<Self> {
        let client = http::build_client(cfg.http_timeout())?;
        let yahoo = Arc::new(YahooFinance::new(client.clone()));

        let resolver = Arc::new(InstrumentResolver::new(vec![
            Box::new(QuoteLookup::new(yahoo.clone())) as Box<dyn SymbolSource>,
            Box::new(SearchPage::new(yahoo.clone())),
            Box::new(AliasTable::default_seed()),
        ]));

        let mut financial_sources: Vec<Box<dyn FinancialSource>> = vec![Box::new((*yahoo).clone())];
        if let Some(key) = &keys.alpha_vantage {
            financial_sources.push(Box::new(AlphaVantage::new(client.clone(), key.clone())));
        }
        let financials: Arc<dyn FinancialSource> = Arc::new(MergedFinancials::new(financial_sources));

        let mut news_sources: Vec<Box<dyn NewsSource>> = Vec::new();
        if let Some(key) = &keys.news_api {
            news_sources.push(Box::new(NewsApi::new(client.clone(), key.clone())));
        }
        news_sources.push(Box::new(YahooRss::new(client.clone())));
        news_sources.push(Box::new(MarketWatch::new(client.clone())));
        let news = NewsAggregator::new(news_sources).with_dedupe(cfg.dedupe_news);

        let lexicon = Lexicon::load(cfg.domain_terms_path.as_deref())?;
        tracing::info!(phrases = lexicon.phrase_count(), "sentiment lexicon loaded");

        let twitter: Box<dyn SocialPlatform> = match &keys.twitter_bearer {
            Some(token) => Box::new(TwitterApiPlatform::new(client.clone(), token.clone())),
            None => Box::new(SearchPagePlatform::twitter_mirror(client.clone())),
        };
        let social = SocialCollector::new(vec![
            twitter,
            Box::new(SearchPagePlatform::reddit(client.clone())),
        ]);

        let mut competitor_sources: Vec<Box<dyn CompetitorSource>> = Vec::new();
        if let Some(key) = &keys.crunchbase {
            competitor_sources.push(Box::new(Crunchbase::new(client.clone(), key.clone())));
        }
        competitor_sources.push(Box::new(StaticCompetitorMap::default_seed()));
        let mut competitors = CompetitorCollector::new(competitor_sources).with_market_caps(
            MarketCapEnricher {
                resolver: resolver.clone(),
                financials: financials.clone(),
            },
        );
        if let Some(key) = &keys.crunchbase {
            competitors = competitors.with_details(Box::new(Crunchbase::new(client.clone(), key.clone())));
        }

        let store: Arc<dyn ResearchStore> = match &cfg.store_dir {
            Some(dir) => Arc::new(JsonFileStore::new(dir.clone())),
            None => Arc::new(MemoryStore::new()),
        };

        Ok(Self {
            profile: Arc::new(WikipediaProfile::new(client)),
            resolver,
            financials,
            news: Arc::new(news),
            scorer: SentimentScorer::new(Arc::new(lexicon)),
            social: Arc::new(social),
            competitors: Arc::new(competitors),
            trend: Arc::new(TrendAnalyzer::new(yahoo)),
            store,
        })
    }
}

#[derive(Debug, Clone)]
struct Settings {
    news_quota: usize,
    competitor_limit: usize,
    trend_period: String,
    forecast_horizon_days: u32,
    stage_timeout: std::time::Duration,
    deadline: std::time::Duration,
}

pub struct ResearchOrchestrator {
    parts: Collaborators,
    settings: Settings,
    permits: Semaphore,
}

impl ResearchOrchestrator {
    pub fn new(parts: Collaborators, cfg: &ResearchConfig) -> Self {
        let cfg = cfg.clone().sanitized();
        crate::metrics::ensure_described();
        Self {
            parts,
            permits: Semaphore::new(cfg.max_concurrency),
            settings: Settings {
                news_quota: cfg.news_quota,
                competitor_limit: cfg.competitor_limit,
                forecast_horizon_days: cfg.forecast_horizon_days,
                stage_timeout: cfg.stage_timeout(),
                deadline: cfg.deadline(),
                trend_period: cfg.trend_period,
            },
        }
    }

    pub fn from_config(cfg: &ResearchConfig, keys: &ApiKeys) -> Result<Self> {
        Ok(Self::new(Collaborators::live(cfg, keys)?, cfg))
    }

    /// Research one company. Fails only for a blank name; every upstream
    /// failure shows up as an empty field instead.
    pub async fn research_company(&self, company_name: &str) -> Result<ResearchRecord, ResearchError> {
        let name = company_name.trim();
        if name.is_empty() {
            return Err(ResearchError::BlankName);
        }
        counter!("research_runs_total").increment(1);
        let started = Instant::now();
        let deadline = started + self.settings.deadline;
        tracing::info!(company = %name, "research started");

        let input_symbol: OnceCell<Option<String>> = OnceCell::new();

        let profile_and_trend = async {
            let profile = self
                .stage("profile", deadline, async {
                    self.parts.profile.lookup_profile(name).await
                })
                .await;
            let trend = match profile.as_ref().and_then(|p| p.company_name.clone()) {
                Some(canonical) => {
                    self.trend_for(&canonical, name, &input_symbol, deadline)
                        .await
                }
                None => {
                    tracing::debug!(company = %name, "no canonical name; trend skipped");
                    None
                }
            };
            (profile, trend)
        };

        let financials = self.stage("financials", deadline, async {
            let Some(symbol) = self.input_symbol(name, &input_symbol).await else {
                tracing::info!(company = %name, "no symbol; financials left empty");
                return Ok(None);
            };
            let f: Financials = self.parts.financials.lookup_financials(&symbol).await?;
            anyhow::Ok((!f.is_empty()).then_some(f))
        });

        let news = async {
            let raw: Vec<NewsItem> = self
                .stage("news", deadline, async {
                    anyhow::Ok(self.parts.news.collect(name, self.settings.news_quota).await)
                })
                .await;
            if raw.is_empty() {
                return raw;
            }
            let scorer = self.parts.scorer.clone();
            self.stage("sentiment", deadline, async move {
                let scored = tokio::task::spawn_blocking(move || scorer.score_all(&raw)).await?;
                anyhow::Ok(scored)
            })
            .await
        };

        let social = self.stage("social", deadline, async {
            anyhow::Ok(self.parts.social.collect(name).await)
        });

        let competitors = self.stage("competitors", deadline, async {
            anyhow::Ok(self
                .parts
                .competitors
                .collect(name, self.settings.competitor_limit)
                .await)
        });

        let ((profile, growth_trend), financials, news, social_sentiment, competitors) =
            tokio::join!(profile_and_trend, financials, news, social, competitors);

        let mut record = ResearchRecord::empty(name);
        record.news_sentiment = aggregate(&news);
        record.profile = profile;
        record.financials = financials;
        record.news = news;
        record.social_sentiment = social_sentiment;
        record.competitors = competitors;
        record.growth_trend = growth_trend;

        self.persist(&record).await;

        let ms = started.elapsed().as_secs_f64() * 1_000.0;
        histogram!("research_duration_ms").record(ms);
        tracing::info!(
            company = %name,
            news = record.news.len(),
            competitors = record.competitors.len(),
            has_profile = record.profile.is_some(),
            has_financials = record.financials.is_some(),
            has_trend = record.growth_trend.is_some(),
            elapsed_ms = ms as u64,
            "research finished"
        );
        Ok(record)
    }

    /// Stored record for `company_name`, without running any collector.
    pub async fn latest(&self, company_name: &str) -> Result<Option<ResearchRecord>> {
        let key = store_key(company_name);
        if key.is_empty() {
            return Ok(None);
        }
        self.parts.store.get_latest(&key).await
    }

    async fn input_symbol(&self, name: &str, cell: &OnceCell<Option<String>>) -> Option<String> {
        cell.get_or_init(|| self.parts.resolver.resolve(name))
            .await
            .clone()
    }

    /// Growth trend for the canonical name, with a forecast attached when
    /// one is available.
    async fn trend_for(
        &self,
        canonical: &str,
        input_name: &str,
        input_symbol: &OnceCell<Option<String>>,
        deadline: Instant,
    ) -> Option<TrendResult> {
        let symbol: Option<String> = self
            .stage("trend_symbol", deadline, async {
                let symbol = if canonical.trim().eq_ignore_ascii_case(input_name.trim()) {
                    self.input_symbol(input_name, input_symbol).await
                } else {
                    self.parts.resolver.resolve(canonical).await
                };
                anyhow::Ok(symbol)
            })
            .await;
        let Some(symbol) = symbol else {
            tracing::info!(company = %input_name, %canonical, "canonical name unresolved; trend skipped");
            return None;
        };

        let period = self.settings.trend_period.as_str();
        let mut trend = self
            .stage("growth_trend", deadline, async {
                self.parts.trend.growth_trend(&symbol, period).await
            })
            .await?;

        trend.forecast = self
            .stage("forecast", deadline, async {
                self.parts
                    .trend
                    .forecast(&symbol, self.settings.forecast_horizon_days)
                    .await
            })
            .await;
        Some(trend)
    }

    /// Run one stage under a permit and the tighter of the stage timeout and
    /// the request deadline. Errors and timeouts become `T::default()`.
    async fn stage<T, F>(&self, stage: &'static str, deadline: Instant, fut: F) -> T
    where
        T: Default,
        F: Future<Output = Result<T>>,
    {
        let stage_timeout = self.settings.stage_timeout;
        let run = async {
            let _permit = self.permits.acquire().await.ok();
            let until = deadline.min(Instant::now() + stage_timeout);
            timeout_at(until, fut).await
        };

        match timeout_at(deadline, run).await {
            Ok(Ok(Ok(v))) => v,
            Ok(Ok(Err(e))) => {
                tracing::warn!(stage, error = %e, "stage failed; using empty default");
                counter!("research_stage_failures_total", "stage" => stage).increment(1);
                T::default()
            }
            Ok(Err(_)) | Err(_) => {
                tracing::warn!(stage, "stage timed out; using empty default");
                counter!("research_stage_failures_total", "stage" => stage).increment(1);
                T::default()
            }
        }
    }

    async fn persist(&self, record: &ResearchRecord) {
        let key = store_key(&record.company_name);
        let write = self.parts.store.upsert(&key, record);
        let res = match tokio::time::timeout(self.settings.stage_timeout, write).await {
            Ok(r) => r,
            Err(_) => Err(anyhow::anyhow!("store write timed out")),
        };
        if let Err(e) = res {
            tracing::warn!(company = %record.company_name, error = %e, "persisting research record failed");
            counter!("research_persist_failures_total").increment(1);
        }
    }
}
