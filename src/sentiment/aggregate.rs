//! Confidence-weighted aggregation of scored news items.

use super::classify;
use crate::model::{round2, Confidence, NewsItem, OverallSentiment, SentimentLabel};

/// Weighted mean of item scores (High=3, Medium=2, Low=1), classified with
/// the single-item rule. Items without a score add nothing to either side
/// of the mean; an item without a tier is weighted as Low.
pub fn aggregate(items: &[NewsItem]) -> OverallSentiment {
    let mut out = OverallSentiment::default();

    let mut numerator = 0.0;
    let mut denominator = 0u32;
    for it in items {
        let Some(score) = it.sentiment_score else {
            continue;
        };
        let w = it.sentiment_confidence.unwrap_or(Confidence::Low).weight();
        numerator += score * f64::from(w);
        denominator += w;
        out.article_count += 1;

        match it.sentiment.unwrap_or_else(|| classify(score).0) {
            SentimentLabel::Positive => out.positive_count += 1,
            SentimentLabel::Neutral => out.neutral_count += 1,
            SentimentLabel::Negative => out.negative_count += 1,
        }
    }

    if denominator == 0 {
        return out;
    }

    let mean = round2(numerator / f64::from(denominator));
    let (label, confidence) = classify(mean);
    out.label = label;
    out.score = mean;
    out.confidence = confidence;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(score: f64, label: SentimentLabel, tier: Confidence) -> NewsItem {
        NewsItem {
            headline: Some("x".into()),
            sentiment: Some(label),
            sentiment_score: Some(score),
            sentiment_confidence: Some(tier),
            ..NewsItem::default()
        }
    }

    #[test]
    fn empty_input_yields_neutral_zero() {
        let o = aggregate(&[]);
        assert_eq!(
            o,
            OverallSentiment {
                label: SentimentLabel::Neutral,
                score: 0.0,
                confidence: Confidence::Low,
                article_count: 0,
                positive_count: 0,
                neutral_count: 0,
                negative_count: 0,
            }
        );
    }

    #[test]
    fn weights_follow_confidence_tiers() {
        // (0.8*3 + -0.3*2) / 5 = 0.36
        let items = vec![
            scored(0.8, SentimentLabel::Positive, Confidence::High),
            scored(-0.3, SentimentLabel::Negative, Confidence::Medium),
        ];
        let o = aggregate(&items);
        assert_eq!(o.score, 0.36);
        assert_eq!(o.label, SentimentLabel::Positive);
        assert_eq!(o.confidence, Confidence::Medium);
        assert_eq!((o.positive_count, o.negative_count), (1, 1));
        assert_eq!(o.article_count, 2);
    }

    #[test]
    fn unscored_items_are_ignored() {
        let items = vec![
            NewsItem::new("no score yet", "Src"),
            scored(-0.6, SentimentLabel::Negative, Confidence::High),
        ];
        let o = aggregate(&items);
        assert_eq!(o.article_count, 1);
        assert_eq!(o.score, -0.6);
        assert_eq!(o.label, SentimentLabel::Negative);
        assert_eq!(o.confidence, Confidence::High);
    }

    #[test]
    fn adding_high_positive_moves_mean_up() {
        let base = vec![
            scored(-0.4, SentimentLabel::Negative, Confidence::Medium),
            scored(0.05, SentimentLabel::Neutral, Confidence::Medium),
            scored(0.3, SentimentLabel::Positive, Confidence::Medium),
        ];
        let before = aggregate(&base).score;
        let mut more = base.clone();
        more.push(scored(0.9, SentimentLabel::Positive, Confidence::High));
        let after = aggregate(&more).score;
        assert!(after > before, "before {before}, after {after}");
    }
}
