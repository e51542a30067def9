//! Request deduplication and short-lived response caching for read requests.
//!
//! [`DeduplicatedFetcher`] sits in front of a [`Transport`]: identical concurrent
//! requests share one network call, and successful responses are replayed for a short
//! TTL. Writers invalidate what they affect with
//! [`DeduplicatedFetcher::clear_cache_for_pattern`].

pub mod cache;
pub mod deduplication;
mod error;
mod key;
mod request;
mod response;
pub mod transport;


use cache::{CacheConfig, ResponseCache};
use deduplication::{Attachment, RequestDeduplicator, SharedOutcome};
use futures::FutureExt;
use std::sync::Arc;

pub use cache::{CacheStats, CachedResponse};
pub use deduplication::DeduplicationStats;
pub use error::{BodyError, FetchError};
pub use key::RequestKey;
pub use request::{Method, Request, RequestOptions};
pub use response::{Response, ResponseSnapshot};
pub use transport::{SurfTransport, Transport};

struct Inner<T> {
    transport: T,
    cache: ResponseCache,
    deduplicator: RequestDeduplicator,
}

/// Drop-in replacement for a plain transport call that never issues two identical
/// read requests at once and replays recent successful responses.
///
/// Cloning is cheap; clones share the same cache.
///
/// Cache misses run on a spawned task, so `fetch` and `send` must be polled inside a
/// Tokio runtime; outside one they panic.
pub struct DeduplicatedFetcher<T: Transport> {
    inner: Arc<Inner<T>>,
}

impl<T: Transport> Clone for DeduplicatedFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Transport> DeduplicatedFetcher<T> {
    pub fn new(transport: T, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                cache: ResponseCache::new(config),
                deduplicator: RequestDeduplicator::new(),
            }),
        }
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.cache.config
    }

    /// Fetch `target` with `options`, deduplicating and caching safe requests.
    pub async fn fetch(
        &self,
        target: impl Into<String>,
        options: RequestOptions,
    ) -> Result<Response, FetchError> {
        self.send(Request::new(target, options)).await
    }

    /// Same as [`fetch`](Self::fetch) for an already assembled request.
    pub async fn send(&self, request: Request) -> Result<Response, FetchError> {
        if !self.inner.cache.config.enabled || !request.method().is_safe() {
            let snapshot = self.inner.transport.perform(&request).await?;
            return Ok(Response::from(snapshot));
        }

        let key = RequestKey::from_request(&request);
        if let Some(snapshot) = self.inner.cache.get(&key) {
            return Ok(Response::new(snapshot));
        }

        let attachment = self.inner.deduplicator.attach_or_start(
            &key,
            || self.inner.cache.get(&key),
            |ticket| Self::spawn_request(self.inner.clone(), key.clone(), ticket, request),
        );

        let snapshot = match attachment {
            Attachment::Cached(snapshot) => snapshot,
            Attachment::Joined(outcome) | Attachment::Started(outcome) => outcome.await?,
        };
        Ok(Response::new(snapshot))
    }

    /// Run the network call on its own task so it settles even if every caller goes away.
    fn spawn_request(
        inner: Arc<Inner<T>>,
        key: RequestKey,
        ticket: u64,
        request: Request,
    ) -> SharedOutcome {
        let handle = tokio::spawn(async move {
            let outcome = inner.transport.perform(&request).await.map(Arc::new);

            match &outcome {
                Ok(snapshot) if !snapshot.is_success() => {
                    log::debug!(
                        "Not caching status {} for key: {}",
                        snapshot.status(),
                        key
                    );
                }
                Ok(_) => {}
                Err(err) => log::warn!("Request failed for key: {}: {}", key, err),
            }

            inner.deduplicator.complete(&key, ticket, || {
                if let Ok(snapshot) = &outcome {
                    if snapshot.is_success() {
                        inner.cache.put(key.clone(), snapshot.clone());
                    }
                }
            });

            outcome
        });

        async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(err) => Err(FetchError::Aborted(err.to_string())),
            }
        }
        .boxed()
        .shared()
    }

    /// Invalidate every cached response and in-flight marker whose key contains `pattern`.
    ///
    /// Call after a successful write with the affected collection's path, e.g.
    /// `/api/products`.
    pub fn clear_cache_for_pattern(&self, pattern: &str) {
        let pending = self.inner.deduplicator.remove_matching(pattern);
        let cached = self.inner.cache.remove_matching(pattern);
        log::debug!(
            "Invalidated {} cached and {} pending entries matching {}",
            cached,
            pending,
            pattern
        );
    }

    /// Empty both the cache and the in-flight map.
    pub fn clear(&self) {
        self.inner.deduplicator.clear();
        self.inner.cache.clear();
    }

    /// Remove expired cache entries now instead of waiting for the lazy sweep.
    pub fn evict_expired(&self) -> usize {
        self.inner.cache.evict_expired()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    pub fn deduplication_stats(&self) -> DeduplicationStats {
        self.inner.deduplicator.stats()
    }
}
