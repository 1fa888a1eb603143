//! Common error types and classification shared by the Tollgate crates
//!
//! Two pieces live here:
//!
//! 1. **`CommonError`**: error variants produced by the generic building blocks
//!    (configuration validation, timeouts, quota exhaustion, capacity limits,
//!    backend failures).
//!
//! 2. **`ErrorClassification`**: a standard interface for classifying errors by
//!    retryability, severity and criticality. Module-specific failures (for
//!    example the gateway's failure payload) implement it so callers can make
//!    retry and alerting decisions without inspecting message text.
//!
//! ## ErrorSeverity Levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Expected conditions | Resource not found |
//! | **Warning** | Degraded but operational | Quota exhausted, timeouts, transient failures |
//! | **Error** | Failure requiring attention | Invalid configuration, auth failures |
//! | **Critical** | System integrity at risk | Internal invariant violations |
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use tollgate_common::error::{CommonError, ErrorClassification, ErrorSeverity};
//!
//! let err = CommonError::rate_limit(Duration::from_secs(900));
//! assert!(err.is_retryable());
//! assert_eq!(err.severity(), ErrorSeverity::Warning);
//! assert_eq!(err.retry_after(), Some(Duration::from_secs(900)));
//! ```

use std::fmt;
use std::time::Duration;

/// Standard result type using CommonError
pub type CommonResult<T> = Result<T, CommonError>;

/// Common error variants that appear across multiple modules
#[derive(Debug, Clone, PartialEq)]
pub enum CommonError {
    /// Configuration-related errors
    Config { message: String, field: Option<String> },

    /// Quota or rate limiting errors
    RateLimitExceeded { retry_after: Option<Duration> },

    /// Timeout errors
    Timeout { operation: String, duration: Duration },

    /// A bounded resource (queue, pool) is full
    CapacityExceeded { resource: String, capacity: usize },

    /// Network or backend connectivity errors
    Backend { service: String, message: String, is_retryable: bool },

    /// Validation errors
    Validation { field: String, message: String },

    /// Permission or authorization errors
    Unauthorized { operation: String },

    /// Internal errors that shouldn't normally occur
    Internal { message: String },
}

impl fmt::Display for CommonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { message, field } => {
                if let Some(field) = field {
                    write!(f, "Configuration error in field '{}': {}", field, message)
                } else {
                    write!(f, "Configuration error: {}", message)
                }
            }
            Self::RateLimitExceeded { retry_after } => {
                if let Some(retry) = retry_after {
                    write!(f, "Rate limit exceeded (retry in {:?})", retry)
                } else {
                    write!(f, "Rate limit exceeded")
                }
            }
            Self::Timeout { operation, duration } => {
                write!(f, "Operation '{}' timed out after {:?}", operation, duration)
            }
            Self::CapacityExceeded { resource, capacity } => {
                write!(f, "Capacity exceeded for '{}' (limit {})", resource, capacity)
            }
            Self::Backend { service, message, .. } => {
                write!(f, "Backend error from '{}': {}", service, message)
            }
            Self::Validation { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            Self::Unauthorized { operation } => {
                write!(f, "Unauthorized to perform '{}'", operation)
            }
            Self::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for CommonError {}

impl ErrorClassification for CommonError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimitExceeded { .. } => true,
            Self::Timeout { .. } => true,
            Self::CapacityExceeded { .. } => true,
            Self::Backend { is_retryable, .. } => *is_retryable,
            _ => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Config { .. } => ErrorSeverity::Error,
            Self::RateLimitExceeded { .. } => ErrorSeverity::Warning,
            Self::Timeout { .. } => ErrorSeverity::Warning,
            Self::CapacityExceeded { .. } => ErrorSeverity::Warning,
            Self::Backend { .. } => ErrorSeverity::Error,
            Self::Validation { .. } => ErrorSeverity::Error,
            Self::Unauthorized { .. } => ErrorSeverity::Error,
            Self::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimitExceeded { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl CommonError {
    /// Create a simple configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), field: None }
    }

    /// Create a configuration error tied to a specific field
    pub fn config_field<S: Into<String>, F: Into<String>>(field: F, message: S) -> Self {
        Self::Config { message: message.into(), field: Some(field.into()) }
    }

    /// Create a rate limit error with a suggested retry delay
    pub fn rate_limit(retry_after: Duration) -> Self {
        Self::RateLimitExceeded { retry_after: Some(retry_after) }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S, duration: Duration) -> Self {
        Self::Timeout { operation: operation.into(), duration }
    }

    /// Create a capacity error for a bounded resource
    pub fn capacity<S: Into<String>>(resource: S, capacity: usize) -> Self {
        Self::CapacityExceeded { resource: resource.into(), capacity }
    }

    /// Create a backend error
    pub fn backend<S: Into<String>, M: Into<String>>(
        service: S,
        message: M,
        is_retryable: bool,
    ) -> Self {
        Self::Backend { service: service.into(), message: message.into(), is_retryable }
    }

    /// Create a validation error
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Create an unauthorized error
    pub fn unauthorized<O: Into<String>>(operation: O) -> Self {
        Self::Unauthorized { operation: operation.into() }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Stable, low-cardinality label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::RateLimitExceeded { .. } => "rate_limit",
            Self::Timeout { .. } => "timeout",
            Self::CapacityExceeded { .. } => "capacity",
            Self::Backend { .. } => "backend",
            Self::Validation { .. } => "validation",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Standard interface for classifying errors
///
/// Implemented by every error or failure type that crosses a component
/// boundary so retry and alerting logic never has to parse messages.
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if attempted
    /// again (timeouts, quota windows, temporary unavailability).
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool;

    /// Get the suggested retry delay if applicable
    fn retry_after(&self) -> Option<Duration>;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

// Standard conversions from common error types
impl From<serde_json::Error> for CommonError {
    fn from(err: serde_json::Error) -> Self {
        Self::config(format!("invalid JSON: {err}"))
    }
}

impl From<toml::de::Error> for CommonError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("invalid TOML: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_mentions_field() {
        let err = CommonError::config_field("window_secs", "must be greater than 0");
        assert_eq!(
            err.to_string(),
            "Configuration error in field 'window_secs': must be greater than 0"
        );
        assert!(!err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert!(CommonError::timeout("probe", Duration::from_secs(5)).is_retryable());
        assert!(CommonError::capacity("request_queue", 8).is_retryable());
        assert!(CommonError::backend("db", "reset by peer", true).is_retryable());
        assert!(!CommonError::backend("db", "syntax error", false).is_retryable());
        assert!(!CommonError::unauthorized("lookup").is_retryable());
    }

    #[test]
    fn only_internal_errors_are_critical() {
        assert!(CommonError::internal("invariant broken").is_critical());
        assert!(!CommonError::validation("handle", "empty").is_critical());
    }

    #[test]
    fn severity_ordering() {
        assert!(ErrorSeverity::Info < ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
        assert_eq!(ErrorSeverity::Critical.to_string(), "CRITICAL");
    }

    #[test]
    fn json_errors_convert_to_config() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: CommonError = json_err.into();
        assert_eq!(err.label(), "config");
    }
}
