//! Typed gateway operations
//!
//! Every operation builds a cache key from the endpoint and its normalized
//! arguments, submits an [`Operation`] to the worker and waits at most the
//! configured ceiling. Callers always get a [`GatewayOutcome`]; nothing here
//! panics or leaks a raw transport error.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tollgate_common::cache::CacheConfig;
use tollgate_common::resilience::{Clock, TokioClock, WindowQuota};
use tollgate_domain::constants::{
    MAX_ACCOUNT_ID_LENGTH, MAX_HANDLE_LENGTH, MAX_POSTS_LIMIT, MIN_POSTS_LIMIT,
};
use tollgate_domain::{
    Endpoint, EndpointRateStatus, GatewayConfig, Post, RateLimitStatus, Result, SocialAccount,
    TollgateError,
};
use tracing::{info, instrument, warn};

use super::failure::{GatewayFailure, GatewayOutcome};
use super::queue::{ApiPayload, Operation, RequestQueue};
use super::worker::{GatewaySnapshot, GatewayWorker};
use crate::ports::SocialApiClient;

const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Public entry point to the social API
pub struct SocialGateway {
    client: Arc<dyn SocialApiClient>,
    queue: RequestQueue,
    snapshot: watch::Receiver<GatewaySnapshot>,
    clock: Arc<dyn Clock>,
    wait_ceiling: Duration,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SocialGateway {
    /// Validate `config` and spawn the worker on the current runtime
    pub fn start(client: Arc<dyn SocialApiClient>, config: &GatewayConfig) -> Result<Self> {
        Self::start_with_clock(client, config, TokioClock)
    }

    pub fn start_with_clock<C: Clock + Clone>(
        client: Arc<dyn SocialApiClient>,
        config: &GatewayConfig,
        clock: C,
    ) -> Result<Self> {
        config.validate()?;

        let quotas = Endpoint::all()
            .into_iter()
            .map(|endpoint| {
                let quota = config.quota_for(endpoint);
                WindowQuota::new(quota.requests_per_window, quota.window())
                    .map(|quota| (endpoint, quota))
                    .map_err(|e| TollgateError::Config(e.to_string()))
            })
            .collect::<Result<HashMap<_, _>>>()?;
        let cache_config = CacheConfig::new(config.cache_ttl(), config.cache_max_entries)
            .map_err(|e| TollgateError::Config(e.to_string()))?;

        let (queue, rx) = RequestQueue::bounded(config.queue_capacity);
        let cancel = CancellationToken::new();
        let (worker, snapshot) = GatewayWorker::new(
            rx,
            queue.sender(),
            quotas,
            cache_config,
            clock.clone(),
            cancel.clone(),
        );
        let handle = tokio::spawn(worker.run());

        info!(
            queue_capacity = config.queue_capacity,
            wait_ceiling_secs = config.wait_ceiling_secs,
            "social gateway started"
        );

        Ok(Self {
            client,
            queue,
            snapshot,
            clock: Arc::new(clock),
            wait_ceiling: config.wait_ceiling(),
            cancel,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Look up and verify an external account by handle
    #[instrument(skip(self))]
    pub async fn verify_account(&self, handle: &str) -> GatewayOutcome<SocialAccount> {
        let handle = normalize_handle(handle)?;
        let cache_key = format!("{}:{handle}", Endpoint::LookupAccount.as_str());

        let client = Arc::clone(&self.client);
        let operation: Operation = Arc::new(move || {
            let client = Arc::clone(&client);
            let handle = handle.clone();
            async move { client.lookup_account(&handle).await.map(ApiPayload::Account) }.boxed()
        });

        match self.enqueue(Endpoint::LookupAccount, cache_key, operation).await? {
            ApiPayload::Account(account) => Ok(account),
            other => Err(unexpected(Endpoint::LookupAccount, &other)),
        }
    }

    /// Recent posts for an account id; `limit` is clamped into `[5, 100]`
    #[instrument(skip(self))]
    pub async fn get_recent_posts(&self, user_id: &str, limit: u32) -> GatewayOutcome<Vec<Post>> {
        let user_id = normalize_account_id(user_id)?;
        let limit = limit.clamp(MIN_POSTS_LIMIT, MAX_POSTS_LIMIT);
        let cache_key = format!("{}:{user_id}:{limit}", Endpoint::FetchPosts.as_str());

        let client = Arc::clone(&self.client);
        let operation: Operation = Arc::new(move || {
            let client = Arc::clone(&client);
            let user_id = user_id.clone();
            async move { client.fetch_posts(&user_id, limit).await.map(ApiPayload::Posts) }.boxed()
        });

        match self.enqueue(Endpoint::FetchPosts, cache_key, operation).await? {
            ApiPayload::Posts(posts) => Ok(posts),
            other => Err(unexpected(Endpoint::FetchPosts, &other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn health_check(&self) -> GatewayOutcome<String> {
        let client = Arc::clone(&self.client);
        let operation: Operation = Arc::new(move || {
            let client = Arc::clone(&client);
            async move { client.probe().await.map(ApiPayload::Health) }.boxed()
        });

        let cache_key = Endpoint::HealthProbe.as_str().to_string();
        match self.enqueue(Endpoint::HealthProbe, cache_key, operation).await? {
            ApiPayload::Health(message) => Ok(message),
            other => Err(unexpected(Endpoint::HealthProbe, &other)),
        }
    }

    /// Window usage per endpoint plus queue and cache sizes
    pub fn get_rate_limit_status(&self) -> RateLimitStatus {
        let snapshot = self.snapshot.borrow().clone();
        let now = self.clock.now();
        let wall_now = Utc::now();

        let endpoints = snapshot
            .windows
            .iter()
            .map(|(endpoint, window)| {
                let quota = window.quota();
                let next_available = window
                    .reset_time()
                    .filter(|reset| *reset > now)
                    .and_then(|reset| chrono::Duration::from_std(reset - now).ok())
                    .map(|remaining| wall_now + remaining);

                let status = EndpointRateStatus {
                    requests_used: window.requests_used(now),
                    requests_limit: quota.requests_per_window,
                    window_minutes: quota.window.as_secs_f64() / 60.0,
                    next_available,
                };
                (endpoint.as_str().to_string(), status)
            })
            .collect::<BTreeMap<_, _>>();

        RateLimitStatus {
            pending_requests: self.queue.pending(),
            cache_entries: snapshot.cache_entries,
            endpoints,
        }
    }

    pub fn pending_requests(&self) -> usize {
        self.queue.pending()
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Stop the worker; queued and deferred requests fail with a shutdown reason
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Ok(());
        }

        info!(pending = self.queue.pending(), "stopping social gateway");
        self.cancel.cancel();

        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            match tokio::time::timeout(JOIN_TIMEOUT, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(error = %e, "gateway worker task panicked");
                    return Err(TollgateError::Internal("gateway worker panicked".into()));
                }
                Err(_) => {
                    warn!("gateway worker did not stop within timeout");
                    return Err(TollgateError::Timeout("gateway worker join".into()));
                }
            }
        }

        Ok(())
    }

    async fn enqueue(
        &self,
        endpoint: Endpoint,
        cache_key: String,
        operation: Operation,
    ) -> GatewayOutcome<ApiPayload> {
        if self.cancel.is_cancelled() {
            return Err(GatewayFailure::shutting_down());
        }

        let rx = self.queue.submit(endpoint, cache_key, operation)?;

        match tokio::time::timeout(self.wait_ceiling, rx).await {
            Ok(Ok(outcome)) => outcome,
            // responder dropped without an answer: the worker is gone
            Ok(Err(_)) => Err(GatewayFailure::shutting_down()),
            Err(_) => {
                warn!(%endpoint, ceiling_secs = self.wait_ceiling.as_secs(), "caller wait ceiling reached");
                Err(GatewayFailure::timeout(endpoint, self.wait_ceiling))
            }
        }
    }
}

impl Drop for SocialGateway {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Strip `@`, trim and lowercase; reject anything that is not a valid handle
pub fn normalize_handle(raw: &str) -> GatewayOutcome<String> {
    let handle = raw.trim();
    let handle = handle.strip_prefix('@').unwrap_or(handle).trim().to_lowercase();

    if handle.is_empty() {
        return Err(GatewayFailure::invalid_input("handle must not be empty"));
    }
    if handle.chars().count() > MAX_HANDLE_LENGTH {
        return Err(GatewayFailure::invalid_input(format!(
            "handle longer than {MAX_HANDLE_LENGTH} characters"
        )));
    }
    if !handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(GatewayFailure::invalid_input(
            "handle may only contain letters, digits and underscores",
        ));
    }
    Ok(handle)
}

/// Account ids go into the request path, so only plain decimal ids pass
pub fn normalize_account_id(raw: &str) -> GatewayOutcome<String> {
    let id = raw.trim();

    if id.is_empty() {
        return Err(GatewayFailure::invalid_input("user id must not be empty"));
    }
    if id.len() > MAX_ACCOUNT_ID_LENGTH || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GatewayFailure::invalid_input(format!(
            "user id must be at most {MAX_ACCOUNT_ID_LENGTH} decimal digits"
        )));
    }
    Ok(id.to_string())
}

fn unexpected(endpoint: Endpoint, payload: &ApiPayload) -> GatewayFailure {
    GatewayFailure::from_error(TollgateError::Internal(format!(
        "unexpected payload for {endpoint}: {payload:?}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_normalization() {
        assert_eq!(normalize_handle("  @Alice_01 ").unwrap(), "alice_01");
        assert_eq!(normalize_handle("bob").unwrap(), "bob");
        assert!(normalize_handle("@").is_err());
        assert!(normalize_handle("").is_err());
        assert!(normalize_handle("a_very_long_handle_indeed").is_err());
        assert!(normalize_handle("semi;colon").is_err());
        assert!(normalize_handle("dash-ed").is_err());
    }

    #[test]
    fn account_ids_must_be_decimal() {
        assert_eq!(normalize_account_id(" 2244994945 ").unwrap(), "2244994945");
        assert!(normalize_account_id("").is_err());
        assert!(normalize_account_id("42/../../users/me").is_err());
        assert!(normalize_account_id("42?max_results=1").is_err());
        assert!(normalize_account_id("42#frag").is_err());
        assert!(normalize_account_id("１２").is_err(), "non-ASCII digits");
        assert!(normalize_account_id(&"9".repeat(21)).is_err());
    }
}
