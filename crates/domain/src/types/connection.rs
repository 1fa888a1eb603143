//! Database connection health types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::CRITICAL_FAILURE_THRESHOLD;

/// Health derived from consecutive failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
    Critical,
}

impl HealthState {
    /// 0 failures is healthy, 1-2 degraded, 3 or more critical
    pub fn from_failure_count(failure_count: u32) -> Self {
        match failure_count {
            0 => Self::Healthy,
            n if n < CRITICAL_FAILURE_THRESHOLD => Self::Degraded,
            _ => Self::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the supervisor's view of the database connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub failure_count: u32,
    pub last_attempt: Option<DateTime<Utc>>,
    pub is_reconnecting: bool,
    pub status: HealthState,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            connected: false,
            failure_count: 0,
            last_attempt: None,
            is_reconnecting: false,
            status: HealthState::Healthy,
        }
    }
}

/// Degraded-mode answers handed out, by category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradedCounts {
    pub points: u64,
    pub leaderboard: u64,
    pub gang: u64,
    pub read: u64,
    pub write: u64,
}

impl DegradedCounts {
    pub fn total(&self) -> u64 {
        self.points + self.leaderboard + self.gang + self.read + self.write
    }
}

/// Connection telemetry for external health reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub connected: bool,
    pub connection_failures: u32,
    pub last_attempt: Option<DateTime<Utc>>,
    pub is_reconnecting: bool,
    pub max_retries: u32,
    pub status: HealthState,
    pub degraded_responses: DegradedCounts,
}

impl ConnectionReport {
    pub fn new(status: ConnectionStatus, max_retries: u32, degraded: DegradedCounts) -> Self {
        Self {
            connected: status.connected,
            connection_failures: status.failure_count,
            last_attempt: status.last_attempt,
            is_reconnecting: status.is_reconnecting,
            max_retries,
            status: status.status,
            degraded_responses: degraded,
        }
    }
}
