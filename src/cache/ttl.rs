//! In-memory cache with per-entry expiry
//!
//! Provides a `TtlCache` that memoizes API responses for the lifetime of the
//! process. Entries older than the configured TTL are dropped the next time
//! they are read.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

/// Default time-to-live for cached API responses (10 minutes)
pub const CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// A single cached value together with the moment it was stored
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    /// The cached value
    value: V,
    /// When the value was stored
    stored_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.duration_since(self.stored_at) > ttl
    }
}

/// Keyed store whose entries expire after a fixed TTL
///
/// Keys are caller-constructed strings that must uniquely identify the query
/// (e.g. `"vendor:abc1:41.0:29.0"`). There is no size bound and no LRU
/// eviction: entries leave the store only when read after expiry or when
/// [`TtlCache::clear`] is called.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    ttl: Duration,
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> TtlCache<V> {
    /// Creates an empty cache using the default 10 minute TTL
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    /// Creates an empty cache with a custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Returns the TTL applied to every entry
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Reads a value from the cache
    ///
    /// Returns `None` if the key is missing. An expired entry is removed from
    /// the store and also reported as `None`.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = Instant::now();
        let expired = self.entries.get(key)?.is_expired(self.ttl, now);

        if expired {
            self.entries.remove(key);
            return None;
        }

        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Stores a value, replacing any previous entry and resetting its age
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries currently held, including ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
