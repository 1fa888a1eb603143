//! Application context - dependency injection container

use std::sync::Arc;

use parking_lot::Mutex;
use tollgate_common::resilience::BackoffPolicy;
use tollgate_core::persistence::SupervisorConfig;
use tollgate_core::ports::{GameConnector, SocialApiClient};
use tollgate_core::{
    ConnectionSupervisor, DegradedModeProvider, ReconnectOutcome, ResilientStore, RetryExecutor,
    SocialGateway,
};
use tollgate_domain::{Config, Endpoint, HealthState, Result, TollgateError};
use tollgate_infra::{PgConnector, SocialHttpClient};
use tracing::{info, warn};

use crate::utils::health::{Component, ComponentHealth, HealthStatus};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub gateway: Arc<SocialGateway>,
    pub store: Arc<ResilientStore>,
    /// Outcome of the last social API probe, repeated while its window is closed
    last_probe: Mutex<Option<ComponentHealth>>,
}

impl AppContext {
    /// Build the production adapters from configuration and start the gateway
    ///
    /// An unreachable database does not fail startup: the store begins in
    /// degraded mode and the first operation retries the connection.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let client = SocialHttpClient::from_config(&config.social)?;
        let connector = PgConnector::from_config(&config.database)?;

        match connector.connect_store().await {
            Ok(store) => {
                if let Err(e) = store.run_migrations().await {
                    warn!(error = %e, "schema migration failed; continuing");
                }
            }
            Err(e) => {
                warn!(error = %e, "database unreachable at startup; starting degraded");
            }
        }

        Self::from_parts(config, Arc::new(client), Arc::new(connector))
    }

    /// Wire the resilience layer around arbitrary port implementations
    ///
    /// Must be called from within a tokio runtime; the gateway worker is
    /// spawned here.
    pub fn from_parts(
        config: Config,
        client: Arc<dyn SocialApiClient>,
        connector: Arc<dyn GameConnector>,
    ) -> Result<Self> {
        config.validate()?;

        let backoff = BackoffPolicy::new(config.retry.base_delay(), config.retry.max_delay())
            .map_err(|e| TollgateError::Config(e.to_string()))?;

        let supervisor = Arc::new(ConnectionSupervisor::new(
            connector,
            SupervisorConfig {
                connection_timeout: config.database.connection_timeout(),
                reconnect_attempts: config.database.reconnect_attempts,
                backoff: backoff.clone(),
            },
        ));
        let executor = RetryExecutor::new(
            supervisor,
            Arc::new(DegradedModeProvider::new()),
            backoff,
            config.retry.max_retries,
        );
        let store = Arc::new(ResilientStore::new(executor));
        let gateway = Arc::new(SocialGateway::start(client, &config.gateway)?);

        info!(
            queue_capacity = config.gateway.queue_capacity,
            max_retries = config.retry.max_retries,
            "application context ready"
        );

        Ok(Self { config, gateway, store, last_probe: Mutex::new(None) })
    }

    /// Check the social API, the database and the request queue
    pub async fn health_check(&self) -> HealthStatus {
        HealthStatus::from_checks(vec![
            self.check_social_health().await,
            self.check_database_health().await,
            self.check_queue_health(),
        ])
    }

    /// Probe the social API through the gateway, unless its quota window is
    /// closed: a probe then would wait out the window, so the last probe's
    /// outcome is reported instead.
    async fn check_social_health(&self) -> ComponentHealth {
        const NAME: Component = Component::SocialApi;

        if !self.gateway.is_running() {
            return ComponentHealth::unhealthy(NAME, "gateway stopped");
        }

        let rate_status = self.gateway.get_rate_limit_status();
        if let Some(next) = rate_status
            .endpoints
            .get(Endpoint::HealthProbe.as_str())
            .and_then(|endpoint| endpoint.next_available)
        {
            let note = format!("probe quota spent; next probe at {}", next.to_rfc3339());
            return match self.last_probe.lock().as_ref() {
                Some(last) => last.carried_over(&note),
                None => ComponentHealth::healthy(NAME).with_detail(note),
            };
        }

        let health = match self.gateway.health_check().await {
            Ok(message) => ComponentHealth::healthy(NAME).with_detail(message),
            Err(failure) => {
                warn!(kind = %failure.kind, reason = %failure.reason, "social API health check failed");
                ComponentHealth::unhealthy(NAME, failure.reason)
            }
        };
        *self.last_probe.lock() = Some(health.clone());
        health
    }

    /// Probe the live handle; if there is none, try one reconnect sequence
    async fn check_database_health(&self) -> ComponentHealth {
        const NAME: Component = Component::Database;
        let supervisor = self.store.supervisor();

        if supervisor.is_connected().await {
            let report = self.store.get_connection_status();
            return match report.status {
                HealthState::Healthy => ComponentHealth::healthy(NAME),
                state => ComponentHealth::unhealthy(
                    NAME,
                    format!("{} ({} consecutive failures)", state, report.connection_failures),
                ),
            };
        }

        match supervisor.reconnect().await {
            ReconnectOutcome::Reconnected => {
                ComponentHealth::healthy(NAME).with_detail("reconnected during health check")
            }
            ReconnectOutcome::AlreadyInProgress => {
                ComponentHealth::unhealthy(NAME, "reconnect in progress")
            }
            ReconnectOutcome::Failed(e) => {
                warn!(error = %e, "database health check failed");
                ComponentHealth::unhealthy(NAME, format!("unreachable: {}", e))
            }
        }
    }

    fn check_queue_health(&self) -> ComponentHealth {
        const NAME: Component = Component::RequestQueue;
        let pending = self.gateway.pending_requests();
        let capacity = self.config.gateway.queue_capacity;

        // unhealthy at 90% of capacity or more
        if pending.saturating_mul(10) >= capacity.saturating_mul(9) {
            ComponentHealth::unhealthy(NAME, format!("{pending} of {capacity} slots in use"))
        } else {
            ComponentHealth::healthy(NAME)
        }
    }

    /// Stop the gateway worker; the store needs no explicit shutdown since
    /// dropping the connection handle aborts its driver task.
    pub async fn shutdown(&self) -> Result<()> {
        info!(pending = self.gateway.pending_requests(), "shutting down application context");
        self.gateway.shutdown().await
    }
}
