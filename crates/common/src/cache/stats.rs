//! Cache statistics

/// Counters collected by a [`TtlCache`](super::TtlCache)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    /// Entries currently stored, including not-yet-purged expired ones
    pub size: usize,

    pub max_entries: usize,

    /// Lookups that returned a live entry
    pub hits: u64,

    /// Lookups that found nothing or an expired entry
    pub misses: u64,

    pub inserts: u64,

    /// Live entries removed to make room
    pub evictions: u64,

    /// Expired entries removed (lazily on lookup or by a purge)
    pub expirations: u64,
}

impl CacheStats {
    /// Calculate hit rate (hits / total accesses)
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn total_accesses(&self) -> u64 {
        self.hits + self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_handles_empty() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);

        let stats = CacheStats { hits: 3, misses: 1, ..CacheStats::default() };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(stats.total_accesses(), 4);
    }
}
