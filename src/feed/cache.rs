//! Bounded fetch cache
//!
//! Least-recently-used eviction with an optional time-to-live. Eviction drops
//! exactly one entry; nothing else is cleared when the cache is full.

use super::{FeedError, FetchRequest, FetchResponse, PriceFetcher};
use crate::config::FeedConfig;
use crate::telemetry::{increment, CounterMetric};
use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct Entry<V> {
    value: V,
    inserted: Instant,
    last_used: u64,
}

/// Capacity-bounded LRU map with optional expiry
pub struct LruCache<K, V> {
    capacity: usize,
    ttl: Option<Duration>,
    entries: HashMap<K, Entry<V>>,
    clock: u64,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// Create a cache holding at most `capacity` entries; 0 stores nothing
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            capacity,
            ttl,
            entries: HashMap::with_capacity(capacity),
            clock: 0,
        }
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    fn is_expired(&self, entry: &Entry<V>, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.saturating_duration_since(entry.inserted) >= ttl)
    }

    pub(crate) fn get_at(&mut self, key: &K, now: Instant) -> Option<&V> {
        let expired = self.entries.get(key).map(|e| self.is_expired(e, now))?;
        if expired {
            self.entries.remove(key);
            return None;
        }

        self.clock += 1;
        let clock = self.clock;
        let entry = self.entries.get_mut(key)?;
        entry.last_used = clock;
        Some(&entry.value)
    }

    pub(crate) fn insert_at(&mut self, key: K, value: V, now: Instant) {
        if self.capacity == 0 {
            return;
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_one(now);
        }

        self.clock += 1;
        self.entries.insert(
            key,
            Entry {
                value,
                inserted: now,
                last_used: self.clock,
            },
        );
    }

    /// Drop an expired entry if there is one, otherwise the least recently used
    fn evict_one(&mut self, now: Instant) {
        let victim = self
            .entries
            .iter()
            .find(|(_, e)| self.is_expired(e, now))
            .or_else(|| self.entries.iter().min_by_key(|(_, e)| e.last_used))
            .map(|(k, _)| k.clone());

        if let Some(key) = victim {
            self.entries.remove(&key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Caching decorator around any [`PriceFetcher`].
///
/// Keyed by the full request. Failed fetches are not cached.
pub struct CachedFetcher<F> {
    inner: F,
    cache: Mutex<LruCache<FetchRequest, FetchResponse>>,
}

impl<F: PriceFetcher> CachedFetcher<F> {
    pub fn new(inner: F, capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity, ttl)),
        }
    }

    /// Build from the `[feed]` config section
    pub fn from_config(inner: F, config: &FeedConfig) -> Self {
        let ttl = (config.cache_ttl_secs > 0).then(|| Duration::from_secs(config.cache_ttl_secs));
        Self::new(inner, config.cache_capacity, ttl)
    }

    /// Number of cached responses
    pub async fn cached(&self) -> usize {
        self.cache.lock().await.len()
    }

    /// Drop every cached response
    pub async fn invalidate(&self) {
        self.cache.lock().await.clear();
    }
}

#[async_trait]
impl<F: PriceFetcher> PriceFetcher for CachedFetcher<F> {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FeedError> {
        if let Some(hit) = self.cache.lock().await.get(request) {
            increment(CounterMetric::CacheHits, 1);
            tracing::debug!(tickers = request.tickers.len(), "Fetch cache hit");
            return Ok(hit.clone());
        }

        increment(CounterMetric::CacheMisses, 1);
        // Lock is not held across the network call
        let response = self.inner.fetch(request).await?;
        self.cache.lock().await.insert(request.clone(), response.clone());

        Ok(response)
    }
}
