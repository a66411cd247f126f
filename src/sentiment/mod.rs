//! # Sentiment
//! Lexicon scoring of news text and confidence-weighted aggregation.
//!
//! Label and confidence come from the same rule for single items and for
//! the aggregate, see [`classify`].

pub mod aggregate;
pub mod lexicon;
pub mod scorer;

pub use aggregate::aggregate;
pub use lexicon::{DomainTerms, Lexicon};
pub use scorer::{SentimentScore, SentimentScorer};

use crate::model::{Confidence, SentimentLabel};

pub const POSITIVE_THRESHOLD: f64 = 0.25;
pub const NEGATIVE_THRESHOLD: f64 = -0.25;
const STRONG: f64 = 0.5;
const NEAR_ZERO: f64 = 0.1;

/// Map a compound score onto a label and a confidence tier.
///
/// `>= 0.25` Positive (High from 0.5), `<= -0.25` Negative (High from -0.5),
/// otherwise Neutral (Medium within 0.1 of zero, else Low).
pub fn classify(score: f64) -> (SentimentLabel, Confidence) {
    if score >= POSITIVE_THRESHOLD {
        let c = if score >= STRONG {
            Confidence::High
        } else {
            Confidence::Medium
        };
        (SentimentLabel::Positive, c)
    } else if score <= NEGATIVE_THRESHOLD {
        let c = if score <= -STRONG {
            Confidence::High
        } else {
            Confidence::Medium
        };
        (SentimentLabel::Negative, c)
    } else {
        let c = if score.abs() <= NEAR_ZERO {
            Confidence::Medium
        } else {
            Confidence::Low
        };
        (SentimentLabel::Neutral, c)
    }
}
