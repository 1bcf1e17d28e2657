use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache as MokaCache;

use super::Cache;
use crate::{CacheError, CacheResult};

/// Entry count bound used by [`InMemoryCache::new`].
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

#[derive(Debug, Clone)]
struct CacheEntry {
    bytes: Arc<[u8]>,
    ttl: Option<Duration>,
}

/// Expires each entry after the TTL it was written with.
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        entry.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        entry.ttl
    }
}

/// In-process cache backed by `moka`, with per-entry expiry.
///
/// Writing with a zero TTL keeps the entry until it is deleted or evicted
/// by the capacity bound.
#[derive(Clone)]
pub struct InMemoryCache {
    entries: MokaCache<String, CacheEntry>,
    unavailable: Arc<AtomicBool>,
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }
}

impl InMemoryCache {
    /// Creates a new empty cache holding up to [`DEFAULT_MAX_ENTRIES`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty cache holding up to `max_entries`.
    pub fn with_capacity(max_entries: u64) -> Self {
        let entries = MokaCache::builder()
            .max_capacity(max_entries)
            .expire_after(EntryTtl)
            .build();

        Self {
            entries,
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the number of live entries.
    pub async fn len(&self) -> usize {
        self.entries.iter().count()
    }

    /// Returns true if no live entry exists.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns true if a live entry exists under `key`.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the keys of all live entries, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self
            .entries
            .iter()
            .map(|(k, _)| k.as_ref().clone())
            .collect();
        keys.sort();
        keys
    }

    /// Clears all entries.
    pub async fn clear(&self) {
        self.remove_matching(|_| true).await;
    }

    /// Makes every subsequent operation fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> CacheResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("cache is offline".to_string()));
        }
        Ok(())
    }

    /// Removes every live key accepted by `matches` and returns how many
    /// were removed.
    async fn remove_matching(&self, matches: impl Fn(&str) -> bool) -> usize {
        let doomed: Vec<Arc<String>> = self
            .entries
            .iter()
            .filter(|(k, _)| matches(k.as_str()))
            .map(|(k, _)| k)
            .collect();

        for key in &doomed {
            self.entries.invalidate(key.as_str()).await;
        }
        doomed.len()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.check_available()?;

        Ok(self.entries.get(key).await.map(|entry| entry.bytes.to_vec()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        self.check_available()?;

        let entry = CacheEntry {
            bytes: value.into(),
            ttl: (!ttl.is_zero()).then_some(ttl),
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.check_available()?;

        self.entries.invalidate(key).await;
        Ok(())
    }

    async fn delete_by_prefix(&self, pattern: &str) -> CacheResult<()> {
        self.check_available()?;

        match pattern.strip_suffix('*') {
            Some(prefix) => {
                let removed = self.remove_matching(|k| k.starts_with(prefix)).await;
                tracing::debug!(pattern, removed, "deleted cache entries by prefix");
            }
            None => self.entries.invalidate(pattern).await,
        }
        Ok(())
    }
}
