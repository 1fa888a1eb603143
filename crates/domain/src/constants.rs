//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! application.

// Gateway
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_WAIT_CEILING_SECS: u64 = 300;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 100;
pub const DEFAULT_REQUESTS_PER_WINDOW: u32 = 1;
pub const DEFAULT_WINDOW_SECS: u64 = 900;
/// Server-side quota rejections tolerated per request before giving up
pub const MAX_QUOTA_REQUEUES: u32 = 3;
pub const SHUTDOWN_REASON: &str = "gateway shutting down";

// Handle normalisation
pub const MAX_HANDLE_LENGTH: usize = 15;
/// Account ids are decimal snowflakes; 20 digits covers u64
pub const MAX_ACCOUNT_ID_LENGTH: usize = 20;
pub const MIN_POSTS_LIMIT: u32 = 5;
pub const MAX_POSTS_LIMIT: u32 = 100;

// Social API
pub const DEFAULT_SOCIAL_BASE_URL: &str = "https://api.twitter.com";
pub const DEFAULT_SOCIAL_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_USER_AGENT: &str = "tollgate/0.1";

// Database
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_RECONNECT_ATTEMPTS: u32 = 2;
/// failure_count at which the connection is reported critical
pub const CRITICAL_FAILURE_THRESHOLD: u32 = 3;

// Retry
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

// Health reporting
pub const HEALTH_REPORT_INTERVAL_SECS: u64 = 60;
pub const HEALTHY_SCORE_THRESHOLD: f64 = 0.8;
