use crate::{error::FetchError, key::RequestKey, response::ResponseSnapshot};
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use futures::future::{BoxFuture, Shared};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Outcome of one network call, awaited by every caller that shares its key
pub type SharedOutcome = Shared<BoxFuture<'static, Result<Arc<ResponseSnapshot>, FetchError>>>;

/// Represents a request that is currently in flight
#[derive(Clone)]
struct PendingRequest {
    /// Identifies this particular call, so a result that lost its marker to invalidation
    /// is never published
    ticket: u64,
    started_at: DateTime<Utc>,
    outcome: SharedOutcome,
}

/// What a caller should do after consulting the in-flight map
pub enum Attachment {
    /// A cached snapshot turned up while the key was locked
    Cached(Arc<ResponseSnapshot>),
    /// Another caller's request is in flight; await its outcome
    Joined(SharedOutcome),
    /// This caller registered and started the request
    Started(SharedOutcome),
}

/// Request deduplication system
/// When multiple identical requests come in, only the first one is executed
/// and the outcome is shared with all waiting requests
#[derive(Default)]
pub struct RequestDeduplicator {
    pending_requests: DashMap<RequestKey, PendingRequest>,
    next_ticket: AtomicU64,
}

impl RequestDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to the in-flight request for `key`, or register a new one.
    ///
    /// Runs under the key's entry lock: `cached` is consulted once more so a result
    /// published between the caller's cache lookup and this call is not fetched again,
    /// and `start` is invoked with a fresh ticket only when nothing is pending.
    pub fn attach_or_start<C, S>(&self, key: &RequestKey, cached: C, start: S) -> Attachment
    where
        C: FnOnce() -> Option<Arc<ResponseSnapshot>>,
        S: FnOnce(u64) -> SharedOutcome,
    {
        match self.pending_requests.entry(key.clone()) {
            Entry::Occupied(entry) => {
                log::debug!("Request already pending for key: {}", key);
                Attachment::Joined(entry.get().outcome.clone())
            }
            Entry::Vacant(entry) => {
                if let Some(snapshot) = cached() {
                    return Attachment::Cached(snapshot);
                }

                log::debug!("Executing new request for key: {}", key);
                let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
                let outcome = start(ticket);
                entry.insert(PendingRequest {
                    ticket,
                    started_at: Utc::now(),
                    outcome: outcome.clone(),
                });
                Attachment::Started(outcome)
            }
        }
    }

    /// Retire the in-flight marker for `key` once its call settled.
    ///
    /// `publish` runs under the entry lock, and only if the marker still belongs to
    /// `ticket`. Returns whether it ran.
    pub fn complete<P>(&self, key: &RequestKey, ticket: u64, publish: P) -> bool
    where
        P: FnOnce(),
    {
        match self.pending_requests.entry(key.clone()) {
            Entry::Occupied(entry) if entry.get().ticket == ticket => {
                publish();
                let pending = entry.remove();
                log::debug!(
                    "Request settled for key: {} after {} ms",
                    key,
                    (Utc::now() - pending.started_at).num_milliseconds()
                );
                true
            }
            _ => {
                log::debug!("Discarding result of invalidated request for key: {}", key);
                false
            }
        }
    }

    /// Forget every in-flight marker whose key contains `pattern`.
    /// Calls already running still finish, but their results are not published.
    pub fn remove_matching(&self, pattern: &str) -> usize {
        let before = self.pending_requests.len();
        self.pending_requests.retain(|key, _| !key.contains(pattern));
        before.saturating_sub(self.pending_requests.len())
    }

    pub fn is_pending(&self, key: &RequestKey) -> bool {
        self.pending_requests.contains_key(key)
    }

    /// Get statistics about pending requests
    pub fn stats(&self) -> DeduplicationStats {
        let now = Utc::now();
        let oldest_pending_ms = self
            .pending_requests
            .iter()
            .map(|entry| (now - entry.value().started_at).num_milliseconds())
            .max();

        DeduplicationStats {
            pending_requests: self.pending_requests.len(),
            oldest_pending_ms,
        }
    }

    /// Clear all pending requests
    pub fn clear(&self) {
        self.pending_requests.clear();
        log::info!("Request deduplicator cleared");
    }
}

/// Statistics for request deduplication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeduplicationStats {
    pub pending_requests: usize,
    pub oldest_pending_ms: Option<i64>,
}
