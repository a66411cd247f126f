//! Compound polarity scoring over the combined lexicon.
//!
//! Per matched word or phrase the valence is adjusted, in order, for
//! capitalised emphasis, a preceding booster/dampener and a negator in the
//! three preceding tokens. The valence sum gets an exclamation boost and is
//! squashed into [-1, 1] with `s / sqrt(s^2 + 15)`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::classify;
use super::lexicon::{tokenize, Lexicon, Token};
use crate::model::{round2, Confidence, NewsItem, SentimentLabel};

const NORMALIZATION_ALPHA: f64 = 15.0;
const NEGATION_SCALAR: f64 = -0.74;
const BOOSTER_INCREMENT: f64 = 0.293;
const CAPS_INCREMENT: f64 = 0.733;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SentimentScore {
    pub label: SentimentLabel,
    /// Compound score in [-1, 1], rounded to two decimals.
    pub score: f64,
    pub confidence: Confidence,
}

impl SentimentScore {
    /// Result for empty or missing text.
    pub fn empty() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
            confidence: Confidence::Low,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentimentScorer {
    lexicon: Arc<Lexicon>,
}

impl SentimentScorer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Score `text`. Pure: identical text always yields the identical result.
    pub fn score(&self, text: &str) -> SentimentScore {
        if text.trim().is_empty() {
            return SentimentScore::empty();
        }
        // Label and tier are derived from the rounded value so the reported
        // score always sits on the same side of a threshold as its label.
        let score = round2(self.compound(text));
        let (label, confidence) = classify(score);
        SentimentScore {
            label,
            score,
            confidence,
        }
    }

    /// Unrounded compound score.
    pub fn compound(&self, text: &str) -> f64 {
        let tokens: Vec<Token> = tokenize(text).collect();
        if tokens.is_empty() {
            return 0.0;
        }
        let shouting_everywhere = tokens.iter().all(|t| is_shouted(&t.raw));

        let mut sum = 0.0;
        let mut i = 0;
        while i < tokens.len() {
            let (span, base) = match self.lexicon.phrase_at(&tokens, i) {
                Some(hit) => hit,
                None => match self.lexicon.word(&tokens[i].lower) {
                    Some(v) => (1, v),
                    None => {
                        i += 1;
                        continue;
                    }
                },
            };

            let mut v = base;
            if !shouting_everywhere && tokens[i..i + span].iter().all(|t| is_shouted(&t.raw)) {
                v += CAPS_INCREMENT * v.signum();
            }
            if i >= 1 {
                if let Some(b) = booster(&tokens[i - 1].lower) {
                    v += b * v.signum();
                }
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(&tokens[i - k].lower));
            if negated {
                v *= NEGATION_SCALAR;
            }

            sum += v;
            i += span;
        }

        if sum != 0.0 {
            let bangs = text.matches('!').count().min(MAX_EXCLAMATIONS) as f64;
            sum += bangs * EXCLAMATION_INCREMENT * sum.signum();
        }

        normalize(sum)
    }

    /// Return a copy of `item` with the sentiment fields populated.
    pub fn score_item(&self, item: &NewsItem) -> NewsItem {
        let s = item
            .scoring_text()
            .map(|t| self.score(&t))
            .unwrap_or_else(SentimentScore::empty);
        NewsItem {
            sentiment: Some(s.label),
            sentiment_score: Some(s.score),
            sentiment_confidence: Some(s.confidence),
            ..item.clone()
        }
    }

    /// Score a batch; input order is preserved.
    pub fn score_all(&self, items: &[NewsItem]) -> Vec<NewsItem> {
        items.iter().map(|it| self.score_item(it)).collect()
    }
}

fn normalize(sum: f64) -> f64 {
    (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

/// Capitalised emphasis: at least two letters, all upper-case.
fn is_shouted(raw: &str) -> bool {
    let letters: Vec<char> = raw.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase())
}

fn booster(tok: &str) -> Option<f64> {
    match tok {
        "very" | "extremely" | "highly" | "hugely" | "incredibly" | "significantly"
        | "substantially" | "sharply" | "massively" | "really" | "totally" | "most" => {
            Some(BOOSTER_INCREMENT)
        }
        "slightly" | "somewhat" | "barely" | "marginally" | "modestly" | "partly" | "little"
        | "kinda" | "hardly" => Some(-BOOSTER_INCREMENT),
        _ => None,
    }
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "weren't"
            | "won't"
            | "can't"
            | "cannot"
            | "doesn't"
            | "don't"
            | "didn't"
            | "without"
            | "nor"
    )
}
