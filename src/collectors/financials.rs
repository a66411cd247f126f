//! Financial-data merging and money formatting.

use anyhow::Result;
use async_trait::async_trait;

use super::FinancialSource;
use crate::model::Financials;

/// Queries sources in order; later sources only fill fields the earlier
/// ones left empty. Fails only when every source failed.
pub struct MergedFinancials {
    sources: Vec<Box<dyn FinancialSource>>,
}

impl MergedFinancials {
    pub fn new(sources: Vec<Box<dyn FinancialSource>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl FinancialSource for MergedFinancials {
    async fn lookup_financials(&self, symbol: &str) -> Result<Financials> {
        let mut merged = Financials::default();
        let mut last_err = None;
        let mut any_ok = false;

        for src in &self.sources {
            match src.lookup_financials(symbol).await {
                Ok(f) => {
                    any_ok = true;
                    merged.fill_missing_from(f);
                    if merged.market_cap.is_some()
                        && merged.stock_price.is_some()
                        && merged.annual_revenue.is_some()
                    {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(%symbol, source = src.name(), error = %e, "financial source failed");
                    last_err = Some(e);
                }
            }
        }

        match (any_ok, last_err) {
            (false, Some(e)) => Err(e),
            _ => Ok(merged),
        }
    }

    fn name(&self) -> &'static str {
        "merged"
    }
}

/// `>= 1e9` → `"$X.XX billion"`, `>= 1e6` → `"$X.XX million"`, else `"$N,NNN"`.
pub fn format_money(amount: f64) -> String {
    if amount >= 1_000_000_000.0 {
        format!("${:.2} billion", amount / 1_000_000_000.0)
    } else if amount >= 1_000_000.0 {
        format!("${:.2} million", amount / 1_000_000.0)
    } else {
        format!("${}", group_thousands(amount.round() as i64))
    }
}

pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Financials);
    struct Broken;

    #[async_trait]
    impl FinancialSource for Fixed {
        async fn lookup_financials(&self, _symbol: &str) -> Result<Financials> {
            Ok(self.0.clone())
        }
        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[async_trait]
    impl FinancialSource for Broken {
        async fn lookup_financials(&self, _symbol: &str) -> Result<Financials> {
            anyhow::bail!("upstream down")
        }
        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[test]
    fn money_scales() {
        assert_eq!(format_money(2_430_000_000.0), "$2.43 billion");
        assert_eq!(format_money(15_500_000.0), "$15.50 million");
        assert_eq!(format_money(987_654.0), "$987,654");
        assert_eq!(format_money(999.0), "$999");
        assert_eq!(format_price(187.2), "$187.20");
    }

    #[tokio::test]
    async fn secondary_only_fills_gaps() {
        let merged = MergedFinancials::new(vec![
            Box::new(Broken),
            Box::new(Fixed(Financials {
                market_cap: Some("$1.00 billion".into()),
                ..Financials::default()
            })),
            Box::new(Fixed(Financials {
                market_cap: Some("$2.00 billion".into()),
                stock_price: Some("$3.00".into()),
                annual_revenue: None,
            })),
        ]);
        let f = merged.lookup_financials("X").await.unwrap();
        assert_eq!(f.market_cap.as_deref(), Some("$1.00 billion"));
        assert_eq!(f.stock_price.as_deref(), Some("$3.00"));
    }

    #[tokio::test]
    async fn all_failing_is_an_error() {
        let merged = MergedFinancials::new(vec![Box::new(Broken), Box::new(Broken)]);
        assert!(merged.lookup_financials("X").await.is_err());
    }
}
