//! Session-token persistence
//!
//! Providers bill a suggest call and its follow-up retrieval as one search
//! session, correlated by an opaque token. The store remembers each
//! provider's token across controller re-constructions within the same
//! runtime session, so a rebuilt adapter can detect an existing session
//! instead of opening a new one.

use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

/// Key-value collaborator that remembers provider session tokens
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the stored token for a provider key
    async fn get(&self, key: &str) -> Option<String>;

    /// Store a token under a provider key
    async fn set(&self, key: &str, value: String);
}

/// In-process session store with a TTL
///
/// Tokens expire after the TTL so a long-lived process does not keep billing
/// against a stale provider session.
pub struct MemorySessionStore {
    cache: Cache<String, String>,
}

impl MemorySessionStore {
    /// Create a new store with the given token TTL
    pub fn new(ttl_seconds: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(1000)
            .build();

        Self { cache }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(3600) // 1 hour TTL
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).await
    }

    async fn set(&self, key: &str, value: String) {
        self.cache.insert(key.to_string(), value).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_roundtrip() {
        let store = MemorySessionStore::default();
        store.set("google", "token-1".to_string()).await;

        assert_eq!(store.get("google").await.as_deref(), Some("token-1"));
        assert_eq!(store.get("mapbox").await, None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = MemorySessionStore::default();
        store.set("mapbox", "token-1".to_string()).await;
        store.set("mapbox", "token-2".to_string()).await;

        assert_eq!(store.get("mapbox").await.as_deref(), Some("token-2"));
    }
}
