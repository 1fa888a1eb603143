//! Cache configuration

use std::time::Duration;

use crate::error::{CommonError, CommonResult};

/// Default time-to-live for cached responses
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default soft capacity
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Configuration for [`TtlCache`](super::TtlCache)
///
/// `max_entries` is a soft bound: it is checked when an insert pushes the
/// cache past it, at which point expired entries are purged first and only
/// then is the oldest live entry evicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl: DEFAULT_TTL, max_entries: DEFAULT_MAX_ENTRIES }
    }
}

impl CacheConfig {
    pub fn new(ttl: Duration, max_entries: usize) -> CommonResult<Self> {
        let config = Self { ttl, max_entries };
        config.validate()?;
        Ok(config)
    }

    /// Quick preset keeping the default capacity
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use tollgate_common::cache::CacheConfig;
    ///
    /// let config = CacheConfig::ttl(Duration::from_secs(60));
    /// assert_eq!(config.max_entries, 100);
    /// ```
    pub fn ttl(ttl: Duration) -> Self {
        Self { ttl, ..Self::default() }
    }

    pub fn validate(&self) -> CommonResult<()> {
        if self.ttl.is_zero() {
            return Err(CommonError::config_field("ttl", "cache ttl must be greater than 0"));
        }
        if self.max_entries == 0 {
            return Err(CommonError::config_field(
                "max_entries",
                "cache max_entries must be greater than 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_gateway_expectations() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(300));
        assert_eq!(config.max_entries, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_values() {
        assert!(CacheConfig::new(Duration::ZERO, 10).is_err());
        assert!(CacheConfig::new(Duration::from_secs(1), 0).is_err());
    }
}
