//! Retry executor for database operations
//!
//! Each attempt first makes sure the supervisor believes in the connection
//! (reconnecting when it does not), then runs the operation against the
//! current handle. Failures are counted, auth failures stop immediately, and
//! everything else is retried after `BackoffPolicy::delay(attempt)`. When the
//! attempts run out the caller receives the degraded-mode default.

use std::future::Future;
use std::sync::Arc;

use tollgate_common::resilience::BackoffPolicy;
use tollgate_domain::{FailureKind, Result, TollgateError};
use tracing::{debug, instrument, warn};

use super::degraded::{Degradable, DegradedModeProvider};
use super::supervisor::{ConnectionSupervisor, ReconnectOutcome};
use crate::ports::GameStore;

/// Per-call retry bookkeeping
#[derive(Debug, Clone)]
pub struct RetryContext {
    pub operation_name: String,
    pub attempt: u32,
    pub max_retries: u32,
    pub last_error: Option<TollgateError>,
}

impl RetryContext {
    fn new(operation_name: &str, max_retries: u32) -> Self {
        Self { operation_name: operation_name.to_string(), attempt: 0, max_retries, last_error: None }
    }

    fn is_last_attempt(&self) -> bool {
        self.attempt + 1 >= self.max_retries
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryOutcome<T> {
    pub value: T,
    /// Times the operation itself was invoked
    pub attempts: u32,
    pub degraded: bool,
    pub last_error: Option<TollgateError>,
}

pub struct RetryExecutor {
    supervisor: Arc<ConnectionSupervisor>,
    degraded: Arc<DegradedModeProvider>,
    backoff: BackoffPolicy,
    max_retries: u32,
}

impl RetryExecutor {
    pub fn new(
        supervisor: Arc<ConnectionSupervisor>,
        degraded: Arc<DegradedModeProvider>,
        backoff: BackoffPolicy,
        max_retries: u32,
    ) -> Self {
        Self { supervisor, degraded, backoff, max_retries: max_retries.max(1) }
    }

    pub fn supervisor(&self) -> &Arc<ConnectionSupervisor> {
        &self.supervisor
    }

    pub fn degraded(&self) -> &Arc<DegradedModeProvider> {
        &self.degraded
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Run `operation`, returning its value or the degraded default
    pub async fn execute<T, F, Fut>(&self, operation_name: &str, operation: F) -> T
    where
        T: Degradable,
        F: FnMut(Arc<dyn GameStore>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute_with_outcome(operation_name, operation).await.value
    }

    #[instrument(skip(self, operation), fields(max_retries = self.max_retries))]
    pub async fn execute_with_outcome<T, F, Fut>(
        &self,
        operation_name: &str,
        mut operation: F,
    ) -> RetryOutcome<T>
    where
        T: Degradable,
        F: FnMut(Arc<dyn GameStore>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut ctx = RetryContext::new(operation_name, self.max_retries);
        let mut attempts = 0;

        while ctx.attempt < ctx.max_retries {
            self.supervisor.record_attempt();

            let needs_reconnect =
                self.supervisor.failure_count() > 0 || !self.supervisor.is_connected().await;
            if needs_reconnect {
                if let ReconnectOutcome::AlreadyInProgress = self.supervisor.reconnect().await {
                    debug!(operation = operation_name, "reconnect in progress; degrading");
                    return self.degrade(ctx, attempts);
                }
            }

            let result = match self.supervisor.store() {
                Some(store) => {
                    attempts += 1;
                    operation(store).await
                }
                None => Err(TollgateError::Connection("database connection unavailable".into())),
            };

            match result {
                Ok(value) => {
                    self.supervisor.record_success();
                    if ctx.attempt > 0 {
                        debug!(operation = operation_name, attempt = ctx.attempt, "succeeded after retry");
                    }
                    return RetryOutcome { value, attempts, degraded: false, last_error: ctx.last_error };
                }
                Err(err) => {
                    self.supervisor.record_failure(&err);
                    let kind = err.failure_kind();
                    warn!(
                        operation = operation_name,
                        attempt = ctx.attempt,
                        kind = %kind,
                        error = %err,
                        failure_count = self.supervisor.failure_count(),
                        "database operation failed"
                    );
                    ctx.last_error = Some(err);

                    if kind == FailureKind::AuthFailure {
                        return self.degrade(ctx, attempts);
                    }
                    if !ctx.is_last_attempt() {
                        let delay = self.backoff.delay(ctx.attempt);
                        debug!(delay_ms = delay.as_millis() as u64, "backing off");
                        tokio::time::sleep(delay).await;
                    }
                }
            }

            ctx.attempt += 1;
        }

        self.degrade(ctx, attempts)
    }

    fn degrade<T: Degradable>(&self, ctx: RetryContext, attempts: u32) -> RetryOutcome<T> {
        let value = self.degraded.fallback(&ctx.operation_name, ctx.last_error.as_ref());
        RetryOutcome { value, attempts, degraded: true, last_error: ctx.last_error }
    }
}
