use std::collections::HashMap;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::models::domain::{Question, TitleDescription};

/// Which pipeline operation produced a cached value. Part of the cache key so
/// generate and extract results for the same content never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Generate,
    Extract,
    TitleDescription,
    MultiAgent,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub operation: OperationKind,
    pub content_fp: String,
    pub settings_fp: String,
}

impl CacheKey {
    pub fn new(operation: OperationKind, content: &str, settings_json: &str) -> Self {
        CacheKey {
            operation,
            content_fp: fingerprint(content),
            settings_fp: fingerprint(settings_json),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CacheValue {
    Questions(Vec<Question>),
    TitleDescription(TitleDescription),
}

struct CacheEntry {
    value: CacheValue,
    inserted_at: Instant,
}

/// Soft memoization of prior pipeline results. A miss only costs a repeated
/// gateway call; entries are never treated as a correctness-bearing identity.
pub struct ResultCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    stale_after: Duration,
    gc_after: Duration,
}

impl Default for ResultCache {
    fn default() -> Self {
        // stale/GC windows match the observed client query-cache defaults
        Self::with_ttls(Duration::from_secs(5 * 60), Duration::from_secs(30 * 60))
    }
}

impl ResultCache {
    pub fn with_ttls(stale_after: Duration, gc_after: Duration) -> Self {
        ResultCache {
            entries: RwLock::new(HashMap::new()),
            stale_after,
            gc_after,
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<CacheValue> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.inserted_at.elapsed() < self.stale_after)
            .map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: CacheKey, value: CacheValue) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.inserted_at.elapsed() < self.gc_after);
        entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Content fingerprint over the FULL input. SHA-256 truncated to 32 hex
/// chars, replacing the prefix+length scheme that collided on long inputs
/// sharing a prefix.
pub fn fingerprint(data: &str) -> String {
    let digest = Sha256::digest(data.as_bytes());
    let mut out = String::with_capacity(32);
    for byte in &digest[..16] {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}
