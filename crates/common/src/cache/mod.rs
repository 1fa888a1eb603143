//! Time-bounded response cache
//!
//! [`TtlCache`] is a single-owner map whose entries expire a fixed time after
//! insertion. Expiry is lazy: an expired entry is dropped the next time it is
//! looked up, or in bulk when an insert pushes the cache past its soft
//! capacity.
//!
//! # Example
//! ```
//! use std::time::Duration;
//!
//! use tollgate_common::cache::{CacheConfig, TtlCache};
//!
//! let mut cache: TtlCache<String, u64> = TtlCache::new(CacheConfig::ttl(Duration::from_secs(300)));
//! cache.insert("account:alice".to_string(), 42);
//! assert_eq!(cache.get(&"account:alice".to_string()), Some(42));
//! ```

pub mod config;
pub mod stats;
pub mod ttl;

pub use config::CacheConfig;
pub use stats::CacheStats;
pub use ttl::TtlCache;
