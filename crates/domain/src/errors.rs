//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Tollgate
///
/// Adapters construct these variants from structured signals (HTTP status
/// codes, driver error kinds), so classification never inspects message text.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum TollgateError {
    /// Network-level failure: refused, reset, DNS, TLS, closed connection
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    /// The remote service reported quota exhaustion
    #[error("Rate limited: {message}")]
    RateLimited { message: String, retry_after_secs: Option<u64> },

    /// A local bounded resource refused new work
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// Query-level database failure on a live connection
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Tollgate operations
pub type Result<T> = std::result::Result<T, TollgateError>;

/// How the resilience layer reacts to a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Window not yet reset; recovered by re-queueing
    QuotaExceeded,
    /// Network or timeout class; retried with backoff
    TransientConnection,
    /// Credential or permission problem; never retried
    AuthFailure,
    /// Anything else; handled like a transient failure
    Unknown,
}

impl FailureKind {
    pub fn is_retryable(self) -> bool {
        !matches!(self, Self::AuthFailure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuotaExceeded => "quota_exceeded",
            Self::TransientConnection => "transient_connection",
            Self::AuthFailure => "auth_failure",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TollgateError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::RateLimited { .. } => FailureKind::QuotaExceeded,
            Self::Connection(_) | Self::Timeout(_) => FailureKind::TransientConnection,
            Self::Auth(_) => FailureKind::AuthFailure,
            _ => FailureKind::Unknown,
        }
    }

    pub fn rate_limited(message: impl Into<String>, retry_after_secs: Option<u64>) -> Self {
        Self::RateLimited { message: message.into(), retry_after_secs }
    }

    /// Server-suggested wait before the next attempt, if any
    pub fn retry_after(&self) -> Option<std::time::Duration> {
        match self {
            Self::RateLimited { retry_after_secs: Some(secs), .. } => {
                Some(std::time::Duration::from_secs(*secs))
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TollgateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("serialization failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_structural() {
        assert_eq!(
            TollgateError::rate_limited("too many", Some(60)).failure_kind(),
            FailureKind::QuotaExceeded
        );
        assert_eq!(
            TollgateError::Connection("reset by peer".into()).failure_kind(),
            FailureKind::TransientConnection
        );
        assert_eq!(
            TollgateError::Timeout("probe".into()).failure_kind(),
            FailureKind::TransientConnection
        );
        assert_eq!(TollgateError::Auth("bad token".into()).failure_kind(), FailureKind::AuthFailure);
        // text that looks like a connection error does not change the kind
        assert_eq!(
            TollgateError::Database("connection refused".into()).failure_kind(),
            FailureKind::Unknown
        );
    }

    #[test]
    fn only_auth_is_terminal() {
        assert!(!FailureKind::AuthFailure.is_retryable());
        assert!(FailureKind::QuotaExceeded.is_retryable());
        assert!(FailureKind::TransientConnection.is_retryable());
        assert!(FailureKind::Unknown.is_retryable());
    }

    #[test]
    fn retry_after_only_for_rate_limits() {
        let err = TollgateError::rate_limited("slow down", Some(900));
        assert_eq!(err.retry_after(), Some(std::time::Duration::from_secs(900)));
        assert_eq!(TollgateError::Timeout("x".into()).retry_after(), None);
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(TollgateError::Auth("expired".into())).unwrap();
        assert_eq!(json["type"], "Auth");
        assert_eq!(json["details"], "expired");
    }
}
