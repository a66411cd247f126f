//! Word and phrase valences.
//!
//! Lookup order for a single word: finance terms from
//! `config/domain_terms.toml`, then the tuned entries embedded from
//! `sentiment_lexicon.json`, then the full VADER word list. Phrases come only
//! from the finance table. The result is an immutable [`Lexicon`] that the
//! scorer borrows.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::model::round2;

static GENERAL: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid sentiment lexicon")
});

thread_local! {
    static VADER: SentimentIntensityAnalyzer<'static> = SentimentIntensityAnalyzer::new();
}

/// VADER valence of a single lower-cased word. The analyzer only exposes
/// compound scores; for a lone word that is `v / sqrt(v^2 + 15)`, inverted
/// here. `None` for words VADER does not know.
pub fn vader_valence(word: &str) -> Option<f64> {
    let c = VADER.with(|a| a.polarity_scores(word).get("compound").copied())?;
    if c == 0.0 || !c.is_finite() || c.abs() >= 1.0 {
        return None;
    }
    Some(round2(c * (15.0 / (1.0 - c * c)).sqrt()))
}

const EMBEDDED_DOMAIN_TERMS: &str = include_str!("../../config/domain_terms.toml");

/// Finance phrase table: `phrase -> valence`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct DomainTerms {
    #[serde(default)]
    pub terms: BTreeMap<String, f64>,
}

impl DomainTerms {
    pub fn embedded() -> Result<Self> {
        Self::parse(EMBEDDED_DOMAIN_TERMS).context("parsing embedded domain terms")
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)
            .with_context(|| format!("reading domain terms from {}", path.display()))?;
        Self::parse(&s).with_context(|| format!("parsing {}", path.display()))
    }

    fn parse(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Phrase {
    tokens: Vec<String>,
    weight: f64,
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    words: HashMap<String, f64>,
    /// Multi-token phrases, longest first.
    phrases: Vec<Phrase>,
}

impl Lexicon {
    /// General lexicon only (tuned entries over VADER), no domain terms.
    pub fn general() -> Self {
        Self {
            words: GENERAL.clone(),
            phrases: Vec::new(),
        }
    }

    /// General lexicon plus the embedded finance terms.
    pub fn standard() -> Result<Self> {
        Ok(Self::general().with_domain_terms(&DomainTerms::embedded()?))
    }

    /// General lexicon plus the terms at `path`, or the embedded ones.
    pub fn load(domain_terms_path: Option<&Path>) -> Result<Self> {
        let terms = match domain_terms_path {
            Some(p) => DomainTerms::load_from(p)?,
            None => DomainTerms::embedded()?,
        };
        Ok(Self::general().with_domain_terms(&terms))
    }

    /// Layer `terms` over the current entries. Single-token terms replace
    /// word valences; multi-token terms become phrases.
    pub fn with_domain_terms(mut self, terms: &DomainTerms) -> Self {
        for (phrase, &weight) in &terms.terms {
            let tokens: Vec<String> = tokenize(phrase).map(|t| t.lower).collect();
            match tokens.len() {
                0 => continue,
                1 => {
                    self.words.insert(tokens[0].clone(), weight);
                }
                _ => {
                    self.phrases.retain(|p| p.tokens != tokens);
                    self.phrases.push(Phrase { tokens, weight });
                }
            }
        }
        self.phrases
            .sort_by(|a, b| b.tokens.len().cmp(&a.tokens.len()));
        self
    }

    pub fn word(&self, w: &str) -> Option<f64> {
        self.words.get(w).copied().or_else(|| vader_valence(w))
    }

    /// Longest phrase starting at `tokens[at]`, as `(token_count, weight)`.
    pub fn phrase_at(&self, tokens: &[Token], at: usize) -> Option<(usize, f64)> {
        let rest = &tokens[at..];
        self.phrases
            .iter()
            .find(|p| {
                p.tokens.len() <= rest.len()
                    && p.tokens.iter().zip(rest).all(|(a, b)| *a == b.lower)
            })
            .map(|p| (p.tokens.len(), p.weight))
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }
}

/// A word with its original spelling kept for emphasis detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub raw: String,
    pub lower: String,
}

/// Alphanumeric runs, apostrophes kept inside words (`isn't`).
pub fn tokenize(s: &str) -> impl Iterator<Item = Token> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| Token {
            raw: t.to_string(),
            lower: t.to_lowercase(),
        })
}
