//! # Trend / Forecast Analyzer
//! Growth, volatility and a five-bucket trend label over a daily price
//! series, plus a naive moving-average drift forecast.
//!
//! The math lives in pure functions over `&[PriceBar]`; [`TrendAnalyzer`]
//! only fetches the series.

use std::sync::Arc;

use anyhow::Result;

use crate::collectors::PriceHistorySource;
use crate::model::{round2, Confidence, Forecast, PriceBar, TrendLabel, TrendResult};

pub const MAX_SMOOTHING_WINDOW: usize = 30;
/// Smoothed points whose mean first-difference is the forecast drift.
pub const DRIFT_POINTS: usize = 5;
/// History fetched for forecasting, independent of the trend period.
pub const FORECAST_PERIOD: &str = "1y";

/// `None` for a blank symbol or an empty series. A single bar gives zero
/// growth and zero volatility.
pub fn growth_trend(symbol: &str, bars: &[PriceBar]) -> Option<TrendResult> {
    let ticker = clean_symbol(symbol)?;
    let (first, last) = (bars.first()?, bars.last()?);

    let growth = if first.close != 0.0 {
        (last.close - first.close) / first.close * 100.0
    } else {
        0.0
    };
    let high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

    Some(TrendResult {
        ticker,
        start_date: first.date,
        end_date: last.date,
        start_price: round2(first.close),
        end_price: round2(last.close),
        high_price: round2(high),
        low_price: round2(low),
        growth_percentage: round2(growth),
        volatility: round2(volatility_pct(bars)),
        trend: TrendLabel::classify(round2(growth)),
        forecast: None,
    })
}

/// Sample standard deviation of day-over-day close returns, in percent.
/// Zero when fewer than two returns exist.
pub fn volatility_pct(bars: &[PriceBar]) -> f64 {
    let returns: Vec<f64> = bars
        .windows(2)
        .filter(|w| w[0].close != 0.0)
        .map(|w| (w[1].close - w[0].close) / w[0].close)
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    var.sqrt() * 100.0
}

/// Trailing simple moving average; only full windows are emitted.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// Linear extrapolation of the smoothed close series `horizon_days` steps
/// ahead. `None` when fewer than two smoothed points exist or the horizon
/// is zero.
pub fn forecast(bars: &[PriceBar], horizon_days: u32) -> Option<Forecast> {
    if horizon_days == 0 {
        return None;
    }
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let window = (closes.len() / 2).min(MAX_SMOOTHING_WINDOW);
    let smoothed = moving_average(&closes, window);
    if smoothed.len() < 2 {
        return None;
    }

    let tail = &smoothed[smoothed.len().saturating_sub(DRIFT_POINTS)..];
    let drift = tail.windows(2).map(|w| w[1] - w[0]).sum::<f64>() / (tail.len() - 1) as f64;
    let last_smoothed = *smoothed.last()?;
    let forecast_price = last_smoothed + drift * f64::from(horizon_days);

    let current = *closes.last()?;
    let change_pct = if current != 0.0 {
        (forecast_price - current) / current * 100.0
    } else {
        0.0
    };

    Some(Forecast {
        current_price: round2(current),
        forecast_price: round2(forecast_price),
        forecast_change_percent: round2(change_pct),
        horizon_days,
        confidence: Confidence::Low,
    })
}

fn clean_symbol(symbol: &str) -> Option<String> {
    let s = symbol.replace('$', "");
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Fetches history and runs the pure analyses above.
pub struct TrendAnalyzer {
    source: Arc<dyn PriceHistorySource>,
}

impl TrendAnalyzer {
    pub fn new(source: Arc<dyn PriceHistorySource>) -> Self {
        Self { source }
    }

    pub async fn growth_trend(&self, symbol: &str, period: &str) -> Result<Option<TrendResult>> {
        let Some(ticker) = clean_symbol(symbol) else {
            return Ok(None);
        };
        let bars = self.source.history(&ticker, period).await?;
        Ok(growth_trend(&ticker, &bars))
    }

    pub async fn forecast(&self, symbol: &str, horizon_days: u32) -> Result<Option<Forecast>> {
        let Some(ticker) = clean_symbol(symbol) else {
            return Ok(None);
        };
        let bars = self.source.history(&ticker, FORECAST_PERIOD).await?;
        Ok(forecast(&bars, horizon_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: c,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
            })
            .collect()
    }

    #[test]
    fn growth_and_extremes() {
        let t = growth_trend("$ACME ", &series(&[100.0, 104.0, 98.0, 110.0])).unwrap();
        assert_eq!(t.ticker, "ACME");
        assert_eq!(t.growth_percentage, 10.0);
        assert_eq!(t.trend, TrendLabel::StrongGrowth);
        assert_eq!(t.high_price, 111.0);
        assert_eq!(t.low_price, 97.0);
        assert_eq!(t.start_price, 100.0);
        assert_eq!(t.end_price, 110.0);
        assert!(t.volatility > 0.0);
        assert!(t.forecast.is_none());
    }

    #[test]
    fn blank_symbol_or_empty_series_is_none() {
        assert!(growth_trend("  ", &series(&[1.0, 2.0])).is_none());
        assert!(growth_trend("$", &series(&[1.0, 2.0])).is_none());
        assert!(growth_trend("ACME", &[]).is_none());
    }

    #[test]
    fn single_point_has_trend_but_no_forecast() {
        let bars = series(&[50.0]);
        let t = growth_trend("ACME", &bars).unwrap();
        assert_eq!(t.growth_percentage, 0.0);
        assert_eq!(t.volatility, 0.0);
        assert_eq!(t.trend, TrendLabel::Stable);
        assert!(forecast(&bars, 30).is_none());
    }

    #[test]
    fn volatility_is_sample_stddev() {
        // returns: +10%, -10%  -> mean 0, sample var = 0.02, sd = 0.1414
        let v = volatility_pct(&series(&[100.0, 110.0, 99.0]));
        assert!((v - 14.142).abs() < 0.01, "{v}");
        assert_eq!(volatility_pct(&series(&[100.0, 110.0])), 0.0);
    }

    #[test]
    fn moving_average_full_windows_only() {
        assert_eq!(moving_average(&[1.0, 2.0, 3.0, 4.0], 2), vec![1.5, 2.5, 3.5]);
        assert!(moving_average(&[1.0], 2).is_empty());
        assert!(moving_average(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn linear_series_extrapolates_its_slope() {
        // 40 closes rising by 1; window 20, smoothed slope 1.
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let f = forecast(&series(&closes), 10).unwrap();
        // last smoothed = mean(120..=139) = 129.5; +10 steps -> 139.5
        assert_eq!(f.forecast_price, 139.5);
        assert_eq!(f.current_price, 139.0);
        assert_eq!(f.forecast_change_percent, round2((139.5 - 139.0) / 139.0 * 100.0));
        assert_eq!(f.confidence, Confidence::Low);
        assert_eq!(f.horizon_days, 10);
    }

    #[test]
    fn window_is_half_the_series_up_to_the_cap() {
        // 30 closes -> window 15 -> 16 smoothed points
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let f = forecast(&series(&closes), 10).unwrap();
        // last smoothed = mean(115..=129) = 122; +10 -> 132
        assert_eq!(f.forecast_price, 132.0);

        // 100 closes -> capped at 30; last smoothed = mean(170..=199) = 184.5
        let closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        let f = forecast(&series(&closes), 10).unwrap();
        assert_eq!(f.forecast_price, 194.5);
    }

    #[test]
    fn short_series_uses_half_window() {
        // 4 closes -> window 2 -> 3 smoothed points
        let f = forecast(&series(&[10.0, 12.0, 14.0, 16.0]), 1).unwrap();
        assert_eq!(f.forecast_price, 17.0);
        // 3 closes -> window 1 -> smoothed = raw
        assert!(forecast(&series(&[10.0, 11.0, 12.0]), 1).is_some());
        // 2 closes -> window 1 -> still two points
        assert!(forecast(&series(&[10.0, 11.0]), 1).is_some());
        assert!(forecast(&series(&[10.0, 11.0]), 0).is_none());
    }
}
