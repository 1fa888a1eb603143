//! Failure payload returned by gateway operations

use std::time::Duration;

use tollgate_common::error::{ErrorClassification, ErrorSeverity};
use tollgate_domain::constants::SHUTDOWN_REASON;
use tollgate_domain::{Endpoint, FailureKind, TollgateError};

/// Result of a gateway operation: the value, or why there is none
pub type GatewayOutcome<T> = Result<T, GatewayFailure>;

/// Why a gateway operation produced no value
///
/// `reason` is the human-readable message handed back to the caller; `error`
/// keeps the typed cause for classification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct GatewayFailure {
    pub kind: FailureKind,
    pub reason: String,
    pub error: TollgateError,
}

impl GatewayFailure {
    pub fn from_error(error: TollgateError) -> Self {
        Self { kind: error.failure_kind(), reason: error.to_string(), error }
    }

    /// The caller's wait ceiling elapsed before the worker resolved the request
    pub fn timeout(endpoint: Endpoint, ceiling: Duration) -> Self {
        let reason =
            format!("timeout after {}s waiting for {}", ceiling.as_secs(), endpoint.as_str());
        Self { kind: FailureKind::TransientConnection, error: TollgateError::Timeout(reason.clone()), reason }
    }

    pub fn queue_full(capacity: usize) -> Self {
        let reason = format!("request queue full ({capacity} pending)");
        Self {
            kind: FailureKind::QuotaExceeded,
            error: TollgateError::CapacityExceeded(reason.clone()),
            reason,
        }
    }

    pub fn shutting_down() -> Self {
        Self {
            kind: FailureKind::Unknown,
            reason: SHUTDOWN_REASON.to_string(),
            error: TollgateError::Internal(SHUTDOWN_REASON.to_string()),
        }
    }

    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::from_error(TollgateError::InvalidInput(reason.into()))
    }
}

impl From<TollgateError> for GatewayFailure {
    fn from(error: TollgateError) -> Self {
        Self::from_error(error)
    }
}

impl ErrorClassification for GatewayFailure {
    fn is_retryable(&self) -> bool {
        !matches!(
            self.error,
            TollgateError::Auth(_)
                | TollgateError::InvalidInput(_)
                | TollgateError::NotFound(_)
                | TollgateError::Config(_)
        ) && self.reason != SHUTDOWN_REASON
    }

    fn severity(&self) -> ErrorSeverity {
        match self.kind {
            FailureKind::QuotaExceeded | FailureKind::TransientConnection => ErrorSeverity::Warning,
            FailureKind::AuthFailure => ErrorSeverity::Error,
            FailureKind::Unknown => match self.error {
                TollgateError::NotFound(_) | TollgateError::InvalidInput(_) => ErrorSeverity::Info,
                _ => ErrorSeverity::Error,
            },
        }
    }

    fn is_critical(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        self.error.retry_after()
    }
}
