//! Database connection supervisor
//!
//! Tracks consecutive failures and owns the current [`GameStore`] handle.
//! Reconnection is single-flight: [`ConnectionSupervisor::reconnect`] claims a
//! [`ReentrancyGuard`] with compare-and-swap, and a concurrent caller gets
//! [`ReconnectOutcome::AlreadyInProgress`] instead of starting a second
//! sequence.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tollgate_common::resilience::{BackoffPolicy, ReentrancyGuard};
use tollgate_domain::{ConnectionStatus, FailureKind, HealthState, TollgateError};
use tracing::{debug, info, instrument, warn};

use crate::ports::{GameConnector, GameStore};

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Bound on each probe and each connect attempt
    pub connection_timeout: Duration,
    /// connect+probe cycles per reconnect sequence
    pub reconnect_attempts: u32,
    pub backoff: BackoffPolicy,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(5),
            reconnect_attempts: 2,
            backoff: BackoffPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconnectOutcome {
    Reconnected,
    /// Another caller is already running a reconnect sequence
    AlreadyInProgress,
    Failed(TollgateError),
}

#[derive(Debug, Default)]
struct SupervisorState {
    connected: bool,
    failure_count: u32,
    last_attempt: Option<DateTime<Utc>>,
}

pub struct ConnectionSupervisor {
    connector: Arc<dyn GameConnector>,
    store: RwLock<Option<Arc<dyn GameStore>>>,
    state: Mutex<SupervisorState>,
    reconnecting: ReentrancyGuard,
    config: SupervisorConfig,
}

impl ConnectionSupervisor {
    pub fn new(connector: Arc<dyn GameConnector>, config: SupervisorConfig) -> Self {
        Self {
            connector,
            store: RwLock::new(None),
            state: Mutex::new(SupervisorState::default()),
            reconnecting: ReentrancyGuard::new(),
            config,
        }
    }

    /// Current handle, if a connection was ever established
    pub fn store(&self) -> Option<Arc<dyn GameStore>> {
        self.store.read().clone()
    }

    /// Probe the current handle, bounded by `connection_timeout`
    pub async fn is_connected(&self) -> bool {
        let connected = match self.store() {
            Some(store) => self.probe(store).await.is_ok(),
            None => false,
        };
        self.state.lock().connected = connected;
        connected
    }

    /// Tear down the handle and establish a fresh one
    ///
    /// `failure_count` counts consecutive failed operations, so it is left
    /// untouched either way; only [`Self::record_success`] clears it. A
    /// reconnect that succeeds while queries keep failing must not hide the
    /// outage.
    #[instrument(skip(self))]
    pub async fn reconnect(&self) -> ReconnectOutcome {
        let Some(_permit) = self.reconnecting.try_enter() else {
            debug!("reconnect already in progress");
            return ReconnectOutcome::AlreadyInProgress;
        };

        self.record_attempt();
        let mut last_error = TollgateError::Connection("no reconnect attempt made".into());

        for attempt in 0..self.config.reconnect_attempts {
            self.teardown();

            match tokio::time::timeout(self.config.connection_timeout, self.connector.connect())
                .await
            {
                Ok(Ok(store)) => {
                    *self.store.write() = Some(Arc::clone(&store));
                    match self.probe(store).await {
                        Ok(()) => {
                            self.state.lock().connected = true;
                            info!(attempt, "database reconnected");
                            return ReconnectOutcome::Reconnected;
                        }
                        Err(e) => last_error = e,
                    }
                }
                Ok(Err(e)) => last_error = e,
                Err(_) => {
                    last_error = TollgateError::Timeout(format!(
                        "connect exceeded {}s",
                        self.config.connection_timeout.as_secs()
                    ));
                }
            }

            warn!(attempt, error = %last_error, "reconnect attempt failed");
            if attempt + 1 < self.config.reconnect_attempts {
                tokio::time::sleep(self.config.backoff.delay(attempt)).await;
            }
        }

        ReconnectOutcome::Failed(last_error)
    }

    pub fn record_attempt(&self) {
        self.state.lock().last_attempt = Some(Utc::now());
    }

    pub fn record_failure(&self, error: &TollgateError) {
        let mut state = self.state.lock();
        state.failure_count = state.failure_count.saturating_add(1);
        if error.failure_kind() == FailureKind::TransientConnection {
            state.connected = false;
        }
        debug!(failure_count = state.failure_count, error = %error, "database failure recorded");
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock();
        state.failure_count = 0;
        state.connected = true;
    }

    pub fn failure_count(&self) -> u32 {
        self.state.lock().failure_count
    }

    pub fn get_status(&self) -> ConnectionStatus {
        let state = self.state.lock();
        ConnectionStatus {
            connected: state.connected,
            failure_count: state.failure_count,
            last_attempt: state.last_attempt,
            is_reconnecting: self.reconnecting.is_active(),
            status: HealthState::from_failure_count(state.failure_count),
        }
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    fn teardown(&self) {
        self.store.write().take();
        self.state.lock().connected = false;
    }

    /// Ping on a separate task so a hung call cannot hold the caller past the bound
    async fn probe(&self, store: Arc<dyn GameStore>) -> Result<(), TollgateError> {
        let mut handle = tokio::spawn(async move { store.ping().await });

        match tokio::time::timeout(self.config.connection_timeout, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(TollgateError::Internal(format!("probe task failed: {join_err}"))),
            Err(_) => {
                handle.abort();
                Err(TollgateError::Timeout(format!(
                    "probe exceeded {}s",
                    self.config.connection_timeout.as_secs()
                )))
            }
        }
    }
}
