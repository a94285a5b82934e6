//! Query Cache
//!
//! Read results keyed by (resource kind, query parameters) with a
//! staleness window. Writes drop entries by key prefix; expired entries are
//! dropped on the read that finds them. Views keep showing their last rows
//! until the refetch resolves.

use crate::api::ListParams;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Default staleness window
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

pub const FILES: &str = "files";
pub const VECTOR_STORES: &str = "vector_stores";
pub const VECTOR_STORE: &str = "vector_store";
pub const MEMBER_FILES: &str = "vector_store_files";

/// Composite cache key: resource kind followed by parameter segments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn files(params: &ListParams) -> Self {
        Self::new([FILES.to_string(), params.canonical()])
    }

    pub fn vector_stores(params: &ListParams) -> Self {
        Self::new([VECTOR_STORES.to_string(), params.canonical()])
    }

    pub fn vector_store(id: &str) -> Self {
        Self::new([VECTOR_STORE, id])
    }

    pub fn member_files(store_id: &str, params: &ListParams) -> Self {
        Self::new([MEMBER_FILES.to_string(), store_id.to_string(), params.canonical()])
    }

    /// True when `prefix` matches this key segment by segment
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        prefix.0.len() <= self.0.len() && self.0.iter().zip(&prefix.0).all(|(a, b)| a == b)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Value,
    fetched_at: Instant,
}

/// Counters for logging and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Number of prefix invalidations requested
    pub invalidations: u64,
}

pub struct QueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
    stale_time: Duration,
    stats: CacheStats,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_TIME)
    }
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stale_time,
            stats: CacheStats::default(),
        }
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    /// Cached data for `key` if it is still inside the staleness window.
    /// An expired entry is dropped.
    pub fn fresh(&mut self, key: &QueryKey, now: Instant) -> Option<Value> {
        let expired = match self.entries.get(key) {
            Some(entry) if now.saturating_duration_since(entry.fetched_at) < self.stale_time => {
                self.stats.hits += 1;
                tracing::trace!("cache hit {}", key);
                return Some(entry.data.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
        }
        self.stats.misses += 1;
        tracing::trace!("cache miss {}", key);
        None
    }

    pub fn store(&mut self, key: QueryKey, data: Value, now: Instant) {
        self.entries.insert(
            key,
            CacheEntry {
                data,
                fetched_at: now,
            },
        );
    }

    /// Drop every entry under `prefix` after a write; counted as one
    /// invalidation. Returns how many entries went.
    pub fn invalidate_prefix(&mut self, prefix: &QueryKey) -> usize {
        self.stats.invalidations += 1;
        let dropped = self.remove_prefix(prefix);
        tracing::debug!("invalidated {} entries under {}", dropped, prefix);
        dropped
    }

    /// Drop every entry under `prefix` (the resource is gone)
    pub fn remove_prefix(&mut self, prefix: &QueryKey) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before - self.entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
