// tests/resolver_chain.rs
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use company_research::resolve::{AliasTable, InstrumentResolver, SymbolSource};

struct Failing;

#[async_trait]
impl SymbolSource for Failing {
    async fn try_resolve(&self, _query: &str) -> Result<Option<String>> {
        anyhow::bail!("connection reset by peer")
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

struct Empty;

#[async_trait]
impl SymbolSource for Empty {
    async fn try_resolve(&self, _query: &str) -> Result<Option<String>> {
        Ok(None)
    }
    fn name(&self) -> &'static str {
        "empty"
    }
}

/// Answers with a fixed symbol and records every query it saw.
struct Fixed {
    symbol: &'static str,
    calls: Arc<AtomicUsize>,
    seen: Arc<std::sync::Mutex<Vec<String>>>,
}

impl Fixed {
    fn new(symbol: &'static str) -> Self {
        Self {
            symbol,
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl SymbolSource for Fixed {
    async fn try_resolve(&self, query: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(query.to_string());
        Ok(Some(self.symbol.to_string()))
    }
    fn name(&self) -> &'static str {
        "fixed"
    }
}

#[tokio::test]
async fn errors_and_misses_fall_through_to_the_next_source() {
    let hit = Fixed::new(" msft ");
    let seen = hit.seen.clone();
    let resolver = InstrumentResolver::new(vec![Box::new(Failing), Box::new(Empty), Box::new(hit)]);

    let got = resolver.resolve("  $Microsoft ").await;
    assert_eq!(got.as_deref(), Some("MSFT"), "symbol is trimmed and upper-cased");
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        ["microsoft".to_string()],
        "query reaches sources trimmed, lower-cased, without the $ marker"
    );
}

#[tokio::test]
async fn first_hit_short_circuits() {
    let first = Fixed::new("AAA");
    let second = Fixed::new("BBB");
    let second_calls = second.calls.clone();
    let resolver = InstrumentResolver::new(vec![Box::new(first), Box::new(second)]);

    assert_eq!(resolver.resolve("anything").await.as_deref(), Some("AAA"));
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn exhausted_chain_is_none_not_an_error() {
    let resolver = InstrumentResolver::new(vec![Box::new(Failing), Box::new(Empty), Box::new(Failing)]);
    assert_eq!(resolver.resolve("Nobody Inc").await, None);

    let empty_chain = InstrumentResolver::new(Vec::new());
    assert_eq!(empty_chain.resolve("Microsoft").await, None);
}

#[tokio::test]
async fn blank_names_never_reach_sources() {
    let source = Fixed::new("X");
    let calls = source.calls.clone();
    let resolver = InstrumentResolver::new(vec![Box::new(source)]);

    assert_eq!(resolver.resolve("").await, None);
    assert_eq!(resolver.resolve("  $ ").await, None);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn offline_alias_table_is_case_insensitive() {
    let resolver = InstrumentResolver::offline();
    assert_eq!(resolver.resolve("Microsoft").await.as_deref(), Some("MSFT"));
    assert_eq!(resolver.resolve("  COCA COLA ").await.as_deref(), Some("KO"));
    assert_eq!(resolver.resolve("Berkshire Hathaway").await.as_deref(), Some("BRK-B"));
    assert_eq!(resolver.resolve("Some Private Startup").await, None);
}

#[tokio::test]
async fn alias_table_is_a_last_resort_after_live_sources() {
    let mut aliases = HashMap::new();
    aliases.insert("Acme Corp".to_string(), "ACME".to_string());
    let resolver = InstrumentResolver::new(vec![
        Box::new(Failing),
        Box::new(Empty),
        Box::new(AliasTable::new(aliases)),
    ]);
    assert_eq!(resolver.resolve("acme corp").await.as_deref(), Some("ACME"));
}
