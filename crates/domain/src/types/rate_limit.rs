//! Gateway rate-limit telemetry

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointRateStatus {
    pub requests_used: u32,
    pub requests_limit: u32,
    pub window_minutes: f64,
    /// Wall-clock time the current window closes; `None` when no window is open
    pub next_available: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub pending_requests: usize,
    pub cache_entries: usize,
    /// Keyed by `Endpoint::as_str`
    pub endpoints: BTreeMap<String, EndpointRateStatus>,
}
