/// Generic in-memory cache with TTL expiry and bounded eviction
///
/// Thread-safe, generic over the cached value type. Keys are strings,
/// derived deterministically from caller arguments via `generate_key`.
/// Expiry is lazy: an expired entry is removed on its next access, never
/// by a background sweep.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use super::config::CacheConfig;
use super::stats::CacheStatistics;
use crate::error::PerfResult;

/// Cache entry with TTL and access tracking
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    ttl: Duration,
    access_count: u64,
    last_accessed: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            ttl,
            access_count: 0,
            last_accessed: now,
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }

    fn touch(&mut self) {
        self.last_accessed = Instant::now();
        self.access_count += 1;
    }
}

struct CacheInner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    stats: CacheStatistics,
}

/// Cache manager owning a single authoritative entry table
pub struct CacheManager<V>
where
    V: Clone,
{
    config: CacheConfig,
    inner: RwLock<CacheInner<V>>,
    ready: bool,
}

impl<V> CacheManager<V>
where
    V: Clone,
{
    /// Create a new cache manager; fails on invalid configuration
    pub fn new(config: CacheConfig) -> PerfResult<Self> {
        config.validate()?;
        log::debug!(
            "Cache manager ready (ttl={:?}, max_size={})",
            config.default_ttl,
            config.max_size
        );

        Ok(Self {
            config,
            inner: RwLock::new(CacheInner {
                entries: HashMap::new(),
                stats: CacheStatistics::new(),
            }),
            ready: true,
        })
    }

    /// Check if the cache is ready for operations
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Get current cache configuration
    pub fn get_config(&self) -> CacheConfig {
        self.config.clone()
    }

    /// Build a deterministic cache key from call arguments
    ///
    /// Positional arguments keep their call order; keyword arguments are
    /// sorted by name, so equal keyword sets produce equal keys regardless
    /// of order. The canonical JSON form is hashed with SHA-256 to bound
    /// key length and avoid adversarial collisions.
    pub fn generate_key(&self, args: &[Value], kwargs: &[(&str, Value)]) -> String {
        let mut sorted: Vec<(&str, Value)> = kwargs.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let payload = json!({
            "args": args,
            "kwargs": sorted,
        });

        let mut hasher = Sha256::new();
        hasher.update(payload.to_string().as_bytes());
        format!("cache:{:x}", hasher.finalize())
    }

    /// Get a value, treating expired entries as absent
    pub fn get(&self, key: &str) -> Option<V> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                inner.stats.record_miss();
                return None;
            }
        };

        if expired {
            if let Some(entry) = inner.entries.remove(key) {
                log::debug!(
                    "Removed expired cache entry: {} ({} reads)",
                    key,
                    entry.access_count
                );
            }
            inner.stats.record_miss();
            return None;
        }

        inner.stats.record_hit();
        inner.entries.get_mut(key).map(|entry| {
            entry.touch();
            entry.value.clone()
        })
    }

    /// Store a value under the default TTL
    pub fn set(&self, key: &str, value: V) {
        self.set_with_ttl(key, value, self.config.default_ttl);
    }

    /// Store a value with an explicit TTL
    ///
    /// Inserting a new key at capacity first evicts the entry with the
    /// oldest last access. Capacity check, eviction, and insert happen
    /// under one write guard.
    pub fn set_with_ttl(&self, key: &str, value: V, ttl: Duration) {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        if inner.entries.len() >= self.config.max_size && !inner.entries.contains_key(key) {
            Self::evict_oldest(inner);
        }

        inner.entries.insert(key.to_string(), CacheEntry::new(value, ttl));
        inner.stats.total_operations += 1;
    }

    /// Remove one entry; returns whether it was present
    pub fn invalidate(&self, key: &str) -> bool {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        if inner.entries.remove(key).is_some() {
            inner.stats.record_invalidation();
            true
        } else {
            false
        }
    }

    /// Remove every key containing `pattern` as a literal substring
    ///
    /// Cascade invalidation for a key family. Substring containment, not
    /// parsing: a pattern occurring in an unrelated key removes that key
    /// too.
    pub fn invalidate_pattern(&self, pattern: &str) -> usize {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let matching: Vec<String> = inner
            .entries
            .keys()
            .filter(|key| key.contains(pattern))
            .cloned()
            .collect();

        for key in &matching {
            inner.entries.remove(key);
            inner.stats.record_invalidation();
        }

        if !matching.is_empty() {
            log::debug!("Invalidated {} entries matching '{}'", matching.len(), pattern);
        }

        matching.len()
    }

    /// Snapshot of counters, rates, and occupancy
    pub fn get_statistics(&self) -> CacheStats {
        let inner = self.inner.read();

        CacheStats {
            hits: inner.stats.hits,
            misses: inner.stats.misses,
            hit_rate: inner.stats.get_hit_rate(),
            miss_rate: inner.stats.get_miss_rate(),
            evictions: inner.stats.evictions,
            invalidations: inner.stats.invalidations,
            total_operations: inner.stats.total_operations,
            current_size: inner.entries.len(),
            max_size: self.config.max_size,
            utilization: inner.entries.len() as f64 / self.config.max_size as f64,
        }
    }

    /// Clear all entries; counters are untouched
    pub fn clear(&self) {
        self.inner.write().entries.clear();
    }

    /// Current number of entries
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Evict the entry with the smallest last-accessed time
    fn evict_oldest(inner: &mut CacheInner<V>) {
        let oldest = inner
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            inner.entries.remove(&key);
            inner.stats.record_eviction();
            log::debug!("Evicted least recently accessed entry: {}", key);
        }
    }
}

/// Point-in-time view of cache counters and occupancy
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub evictions: u64,
    pub invalidations: u64,
    pub total_operations: u64,
    pub current_size: usize,
    pub max_size: usize,
    pub utilization: f64,
}
