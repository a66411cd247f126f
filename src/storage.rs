//! Persistence of research records, keyed by folded company name.
//!
//! Upsert semantics: the last write for a key wins.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::ResearchRecord;
use crate::text::fold_key;

#[async_trait]
pub trait ResearchStore: Send + Sync {
    async fn upsert(&self, key: &str, record: &ResearchRecord) -> Result<()>;
    async fn get_latest(&self, key: &str) -> Result<Option<ResearchRecord>>;
}

/// Trimmed, whitespace-collapsed, lower-cased company name.
pub fn store_key(company_name: &str) -> String {
    fold_key(company_name)
}

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, ResearchRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl ResearchStore for MemoryStore {
    async fn upsert(&self, key: &str, record: &ResearchRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(store_key(key), record.clone());
        Ok(())
    }

    async fn get_latest(&self, key: &str) -> Result<Option<ResearchRecord>> {
        Ok(self.records.read().await.get(&store_key(key)).cloned())
    }
}

/// One pretty-printed JSON document per key under `dir`.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }
}

/// Filesystem-safe stem: alphanumerics kept, everything else `_`.
fn file_stem(key: &str) -> String {
    let k = store_key(key);
    let stem: String = k
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "_".to_string()
    } else {
        stem
    }
}

#[async_trait]
impl ResearchStore for JsonFileStore {
    async fn upsert(&self, key: &str, record: &ResearchRecord) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating store dir {}", self.dir.display()))?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(record).context("serializing research record")?;

        tokio::fs::write(&tmp, &body)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("renaming {} -> {}", tmp.display(), path.display()))?;

        tracing::debug!(key = %store_key(key), path = %path.display(), "record stored");
        Ok(())
    }

    async fn get_latest(&self, key: &str) -> Result<Option<ResearchRecord>> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        let rec = serde_json::from_slice(&bytes)
            .with_context(|| format!("decoding {}", path.display()))?;
        Ok(Some(rec))
    }
}
