use crate::{key::RequestKey, response::ResponseSnapshot};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for the response cache
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// How long a successful response stays servable
    pub ttl: Duration,
    /// Cache size above which expired entries are swept on insert
    pub sweep_threshold: usize,
    /// Whether deduplication and caching are enabled
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(30),
            sweep_threshold: 100,
            enabled: true,
        }
    }
}

impl CacheConfig {
    pub fn new(ttl: Duration, sweep_threshold: usize) -> Self {
        Self {
            ttl,
            sweep_threshold,
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Cached response with metadata
#[derive(Clone, Debug)]
pub struct CachedResponse {
    pub snapshot: Arc<ResponseSnapshot>,
    pub created_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl CachedResponse {
    pub fn new(snapshot: Arc<ResponseSnapshot>, ttl: Duration) -> Self {
        Self {
            snapshot,
            created_at: Utc::now(),
            ttl,
        }
    }

    /// Check if the cached response is still valid. A TTL reaching past the
    /// representable range never expires.
    pub fn is_valid(&self) -> bool {
        match self.created_at.checked_add_signed(self.ttl) {
            Some(expires_at) => Utc::now() < expires_at,
            None => true,
        }
    }
}

/// Short-lived store of successful responses keyed by request identity
pub struct ResponseCache {
    cache: DashMap<RequestKey, CachedResponse>,
    pub config: CacheConfig,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            cache: DashMap::new(),
            config,
        }
    }

    /// Get the cached snapshot if present and not expired
    pub fn get(&self, key: &RequestKey) -> Option<Arc<ResponseSnapshot>> {
        let expired = match self.cache.get(key) {
            Some(cached) if cached.is_valid() => {
                log::debug!("Cache hit for key: {}", key);
                return Some(cached.snapshot.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            log::debug!("Cache expired for key: {}", key);
            self.cache.remove_if(key, |_, cached| !cached.is_valid());
        }

        log::debug!("Cache miss for key: {}", key);
        None
    }

    /// Store a snapshot, sweeping expired entries once the map grows past the threshold
    pub fn put(&self, key: RequestKey, snapshot: Arc<ResponseSnapshot>) {
        log::debug!("Stored in cache with key: {}", key);
        self.cache
            .insert(key, CachedResponse::new(snapshot, self.config.ttl));

        if self.cache.len() > self.config.sweep_threshold {
            self.evict_expired();
        }
    }

    /// Remove expired entries from cache
    pub fn evict_expired(&self) -> usize {
        let before = self.cache.len();
        self.cache.retain(|_, cached| cached.is_valid());
        let evicted = before.saturating_sub(self.cache.len());

        log::debug!("Evicted {} expired cache entries", evicted);
        evicted
    }

    /// Remove every entry whose key contains `pattern`
    pub fn remove_matching(&self, pattern: &str) -> usize {
        let before = self.cache.len();
        self.cache.retain(|key, _| !key.contains(pattern));
        before.saturating_sub(self.cache.len())
    }

    /// Clear all cache entries
    pub fn clear(&self) {
        self.cache.clear();
        log::info!("Response cache cleared");
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let total_entries = self.cache.len();
        let expired_entries = self
            .cache
            .iter()
            .filter(|entry| !entry.value().is_valid())
            .count();

        CacheStats {
            total_entries,
            valid_entries: total_entries.saturating_sub(expired_entries),
            expired_entries,
            sweep_threshold: self.config.sweep_threshold,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub sweep_threshold: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Request, RequestOptions};

    fn key(target: &str) -> RequestKey {
        RequestKey::from_request(&Request::new(target, RequestOptions::new()))
    }

    fn snapshot(body: &'static str) -> Arc<ResponseSnapshot> {
        Arc::new(ResponseSnapshot::new(200, vec![], body))
    }

    #[test]
    fn test_cached_response_validity() {
        let cached = CachedResponse::new(snapshot("[]"), Duration::seconds(1));
        assert!(cached.is_valid());

        let expired = CachedResponse {
            snapshot: snapshot("[]"),
            created_at: Utc::now() - Duration::seconds(2),
            ttl: Duration::seconds(1),
        };
        assert!(!expired.is_valid());
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let ttl = Duration::try_seconds(100_000_000_000_000).unwrap();
        let cache = ResponseCache::new(CacheConfig::new(ttl, 100));
        cache.put(key("/api/products"), snapshot("[]"));

        assert!(cache.get(&key("/api/products")).is_some());
        assert_eq!(cache.stats().valid_entries, 1);
    }

    #[test]
    fn test_expired_entries_are_not_returned() {
        let cache = ResponseCache::new(CacheConfig::new(Duration::seconds(30), 100));
        let stale = key("/api/products");
        cache.cache.insert(
            stale.clone(),
            CachedResponse {
                snapshot: snapshot("[]"),
                created_at: Utc::now() - Duration::seconds(31),
                ttl: Duration::seconds(30),
            },
        );

        assert!(cache.get(&stale).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_sweep_runs_past_threshold() {
        let cache = ResponseCache::new(CacheConfig::new(Duration::seconds(30), 2));
        for target in ["/api/a", "/api/b"] {
            cache.cache.insert(
                key(target),
                CachedResponse {
                    snapshot: snapshot("[]"),
                    created_at: Utc::now() - Duration::minutes(5),
                    ttl: Duration::seconds(30),
                },
            );
        }

        // Third entry crosses the threshold and triggers the sweep.
        cache.put(key("/api/c"), snapshot("[]"));

        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("/api/c")).is_some());
    }

    #[test]
    fn test_remove_matching() {
        let cache = ResponseCache::new(CacheConfig::default());
        cache.put(key("/api/products"), snapshot("[]"));
        cache.put(key("/api/products/42"), snapshot("{}"));
        cache.put(key("/api/categories"), snapshot("[]"));

        assert_eq!(cache.remove_matching("/api/products"), 2);
        assert!(cache.get(&key("/api/categories")).is_some());
        assert!(cache.get(&key("/api/products")).is_none());
    }

    #[test]
    fn test_stats() {
        let cache = ResponseCache::new(CacheConfig::default());
        cache.put(key("/api/products"), snapshot("[]"));

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.valid_entries, 1);
        assert_eq!(stats.expired_entries, 0);
        assert_eq!(stats.sweep_threshold, 100);
    }
}
