//! TTL cache with lazy expiry and oldest-first eviction

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

use tracing::trace;

use super::config::CacheConfig;
use super::stats::CacheStats;
use crate::resilience::clock::{Clock, SystemClock};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Single-owner cache; all operations take `&mut self`
#[derive(Debug)]
pub struct TtlCache<K, V, C: Clock = SystemClock> {
    entries: HashMap<K, CacheEntry<V>>,
    config: CacheConfig,
    clock: C,
    stats: CacheStats,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V, SystemClock> {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K: Eq + Hash + Clone, V: Clone, C: Clock> TtlCache<K, V, C> {
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self { entries: HashMap::new(), config, clock, stats: CacheStats::default() }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Return a clone of the live value for `key`, dropping it if expired
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let expired = match self.entries.get(key) {
            None => {
                self.stats.misses += 1;
                return None;
            }
            Some(entry) => self.is_expired(entry, now),
        };

        if expired {
            self.entries.remove(key);
            self.stats.expirations += 1;
            self.stats.misses += 1;
            return None;
        }

        self.stats.hits += 1;
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Insert or replace `key`, resetting its age
    pub fn insert(&mut self, key: K, value: V) {
        let now = self.clock.now();
        self.entries.insert(key, CacheEntry { value, inserted_at: now });
        self.stats.inserts += 1;

        if self.entries.len() > self.config.max_entries {
            self.purge_expired();
            while self.entries.len() > self.config.max_entries {
                if !self.evict_oldest() {
                    break;
                }
            }
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Drop every expired entry; returns how many were removed
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let ttl = self.config.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| now.saturating_duration_since(entry.inserted_at) < ttl);
        let removed = before - self.entries.len();
        if removed > 0 {
            self.stats.expirations += removed as u64;
            trace!(removed, "purged expired cache entries");
        }
        removed
    }

    /// Stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that would still be served by `get`
    pub fn live_len(&self) -> usize {
        let now = self.clock.now();
        self.entries.values().filter(|entry| !self.is_expired(entry, now)).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats { size: self.entries.len(), max_entries: self.config.max_entries, ..self.stats }
    }

    fn is_expired(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) >= self.config.ttl
    }

    fn evict_oldest(&mut self) -> bool {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.inserted_at)
            .map(|(key, _)| key.clone());

        match oldest {
            Some(key) => {
                self.entries.remove(&key);
                self.stats.evictions += 1;
                true
            }
            None => false,
        }
    }
}
