//! Cache-aside reads and writes shared by every service.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use store::{Cache, CacheCodec, JsonCodec, keys};

use crate::error::Result;

/// Typed view over a [`Cache`] that encodes values with a [`CacheCodec`].
///
/// Every value is stored without expiry; freshness relies on the services
/// deleting entity keys and collection prefixes on write.
#[derive(Clone)]
pub struct CacheAside<C, K = JsonCodec> {
    cache: C,
    codec: K,
}

impl<C: Cache> CacheAside<C> {
    /// Creates a cache view using the JSON codec.
    pub fn new(cache: C) -> Self {
        Self::with_codec(cache, JsonCodec)
    }
}

impl<C: Cache, K: CacheCodec> CacheAside<C, K> {
    /// Creates a cache view using `codec`.
    pub fn with_codec(cache: C, codec: K) -> Self {
        Self { cache, codec }
    }

    /// Returns the underlying cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Reads and decodes `key`.
    ///
    /// A miss is `Ok(None)`. A backend error or an undecodable value is an
    /// error, never a miss.
    pub async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let prefix = keys::prefix(key).to_string();
        match self.cache.get(key).await? {
            Some(bytes) => {
                metrics::counter!("cache_hits_total", "key_prefix" => prefix).increment(1);
                Ok(Some(self.codec.decode(&bytes)?))
            }
            None => {
                metrics::counter!("cache_misses_total", "key_prefix" => prefix).increment(1);
                Ok(None)
            }
        }
    }

    /// Encodes `value` and stores it under `key` without expiry.
    pub async fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = self.codec.encode(value)?;
        self.cache.set(key, bytes, Duration::ZERO).await?;
        Ok(())
    }

    /// Deletes a single key.
    pub async fn remove(&self, key: &str) -> Result<()> {
        self.cache.delete(key).await?;
        Ok(())
    }

    /// Deletes every cached page of `collection`.
    pub async fn invalidate(&self, collection: &str) -> Result<()> {
        self.cache
            .delete_by_prefix(&keys::collection_pattern(collection))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomainError;
    use store::InMemoryCache;

    #[tokio::test]
    async fn write_then_read() {
        let cached = CacheAside::new(InMemoryCache::new());
        cached.write("payment:1", &vec![1u32, 2, 3]).await.unwrap();

        let value: Option<Vec<u32>> = cached.read("payment:1").await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn undecodable_value_is_internal() {
        let cache = InMemoryCache::new();
        cache
            .set("payment:1", b"{broken".to_vec(), Duration::ZERO)
            .await
            .unwrap();
        let cached = CacheAside::new(cache);

        let result: Result<Option<Vec<u32>>> = cached.read("payment:1").await;
        assert_eq!(result, Err(DomainError::Internal));
    }

    #[tokio::test]
    async fn invalidate_drops_collection_pages_only() {
        let cache = InMemoryCache::new();
        let cached = CacheAside::new(cache.clone());
        cached.write("payments:1-10", &1).await.unwrap();
        cached.write("payments:2-10", &2).await.unwrap();
        cached.write("payment:1", &3).await.unwrap();

        cached.invalidate("payments").await.unwrap();

        assert_eq!(cache.keys().await, vec!["payment:1".to_string()]);
    }

    #[tokio::test]
    async fn unavailable_cache_is_internal() {
        let cache = InMemoryCache::new();
        cache.set_unavailable(true);
        let cached = CacheAside::new(cache);

        assert_eq!(cached.write("user:1", &1).await, Err(DomainError::Internal));
        assert_eq!(cached.remove("user:1").await, Err(DomainError::Internal));
    }
}
