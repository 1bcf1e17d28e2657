//! Key-value cache port, key scheme and value codec.

mod memory;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CacheResult;

pub use memory::{DEFAULT_MAX_ENTRIES, InMemoryCache};

/// Time-bounded key-value cache.
///
/// A `ttl` of zero stores the value without expiry.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the stored bytes, or `None` on a miss (absent or expired).
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()>;

    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Deletes every key matching `pattern`.
    ///
    /// A trailing `*` matches any suffix; a pattern without `*` matches
    /// exactly one key.
    async fn delete_by_prefix(&self, pattern: &str) -> CacheResult<()>;
}

/// Cache key scheme shared by every service.
pub mod keys {
    use std::fmt::Display;

    /// Key of a single entity: `"<entity>:<id>"`.
    pub fn entity(entity: &str, id: impl Display) -> String {
        format!("{entity}:{id}")
    }

    /// Key of a collection page: `"<collection>:<params>"`.
    pub fn list(collection: &str, params: &str) -> String {
        format!("{collection}:{params}")
    }

    /// Pattern matching every page of a collection: `"<collection>:*"`.
    pub fn collection_pattern(collection: &str) -> String {
        format!("{collection}:*")
    }

    /// Returns the part of a key before the first `:`.
    pub fn prefix(key: &str) -> &str {
        key.split_once(':').map_or(key, |(prefix, _)| prefix)
    }
}

/// Encodes values stored in the cache.
///
/// Implementations must round-trip every model type exactly.
pub trait CacheCodec: Send + Sync {
    fn encode<T: Serialize>(&self, value: &T) -> CacheResult<Vec<u8>>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CacheResult<T>;
}

/// JSON cache codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl CacheCodec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> CacheResult<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CacheResult<T> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Category, CategoryId};

    #[test]
    fn key_scheme() {
        assert_eq!(keys::entity("order", 7), "order:7");
        assert_eq!(keys::list("orders", "1-10"), "orders:1-10");
        assert_eq!(keys::collection_pattern("orders"), "orders:*");
        assert_eq!(keys::prefix("orders:1-10"), "orders");
        assert_eq!(keys::prefix("plain"), "plain");
    }

    #[test]
    fn json_codec_preserves_model_values() {
        let now = chrono::Utc::now();
        let category = Category {
            id: CategoryId::new(1),
            name: "Drinks".to_string(),
            created_at: now,
            updated_at: now,
        };

        let bytes = JsonCodec.encode(&category).unwrap();
        let decoded: Category = JsonCodec.decode(&bytes).unwrap();
        assert_eq!(decoded, category);
    }

    #[test]
    fn json_codec_rejects_garbage() {
        let result: CacheResult<Category> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(crate::CacheError::Serialization(_))));
    }
}
