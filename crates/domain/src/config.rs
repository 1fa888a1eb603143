//! Application configuration structures
//!
//! Every section has serde defaults, so a config file only needs to name the
//! values it changes. Loading lives in `tollgate-infra::config`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::errors::{Result, TollgateError};
use crate::types::Endpoint;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub social: SocialConfig,
    pub database: DatabaseConfig,
    pub retry: RetryConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject values that would make the resilience layer misbehave
    pub fn validate(&self) -> Result<()> {
        self.gateway.validate()?;
        self.retry.validate()?;

        if self.database.connection_timeout_secs == 0 {
            return Err(TollgateError::Config(
                "database.connection_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.social.request_timeout_secs == 0 {
            return Err(TollgateError::Config(
                "social.request_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Quota for one endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointQuotaConfig {
    pub requests_per_window: u32,
    pub window_secs: u64,
}

impl Default for EndpointQuotaConfig {
    fn default() -> Self {
        Self { requests_per_window: DEFAULT_REQUESTS_PER_WINDOW, window_secs: DEFAULT_WINDOW_SECS }
    }
}

impl EndpointQuotaConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub queue_capacity: usize,
    /// Longest a caller waits for a queued request
    pub wait_ceiling_secs: u64,
    pub cache_ttl_secs: u64,
    pub cache_max_entries: usize,
    pub lookup_account: EndpointQuotaConfig,
    pub fetch_posts: EndpointQuotaConfig,
    pub health_probe: EndpointQuotaConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            wait_ceiling_secs: DEFAULT_WAIT_CEILING_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            lookup_account: EndpointQuotaConfig::default(),
            fetch_posts: EndpointQuotaConfig::default(),
            health_probe: EndpointQuotaConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn quota_for(&self, endpoint: Endpoint) -> EndpointQuotaConfig {
        match endpoint {
            Endpoint::LookupAccount => self.lookup_account,
            Endpoint::FetchPosts => self.fetch_posts,
            Endpoint::HealthProbe => self.health_probe,
        }
    }

    pub fn wait_ceiling(&self) -> Duration {
        Duration::from_secs(self.wait_ceiling_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(TollgateError::Config("gateway.queue_capacity must be greater than 0".into()));
        }
        if self.wait_ceiling_secs == 0 {
            return Err(TollgateError::Config(
                "gateway.wait_ceiling_secs must be greater than 0".into(),
            ));
        }
        if self.cache_ttl_secs == 0 || self.cache_max_entries == 0 {
            return Err(TollgateError::Config(
                "gateway cache ttl and max entries must be greater than 0".into(),
            ));
        }
        for endpoint in Endpoint::all() {
            let quota = self.quota_for(endpoint);
            if quota.requests_per_window == 0 || quota.window_secs == 0 {
                return Err(TollgateError::Config(format!(
                    "gateway.{}: requests_per_window and window_secs must be greater than 0",
                    endpoint.as_str()
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SOCIAL_BASE_URL.to_string(),
            bearer_token: None,
            request_timeout_secs: DEFAULT_SOCIAL_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// libpq-style connection string or `postgres://` URL
    pub url: String,
    pub connection_timeout_secs: u64,
    pub require_tls: bool,
    /// connect+probe cycles in one reconnect sequence
    pub reconnect_attempts: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/tollgate".to_string(),
            connection_timeout_secs: DEFAULT_CONNECTION_TIMEOUT_SECS,
            require_tls: false,
            reconnect_attempts: DEFAULT_RECONNECT_ATTEMPTS,
        }
    }
}

impl DatabaseConfig {
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(TollgateError::Config("retry.max_retries must be greater than 0".into()));
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(TollgateError::Config(format!(
                "retry.base_delay_ms ({}) cannot exceed retry.max_delay_ms ({})",
                self.base_delay_ms, self.max_delay_ms
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
