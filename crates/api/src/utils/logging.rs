use std::time::Duration;

use tollgate_domain::{FailureKind, LoggingConfig, TollgateError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to every
/// target. Returns `false` when a subscriber was already installed (tests
/// and embedding hosts may have done so), which is not an error.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json {
        builder.json().with_current_span(true).try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        info!(level = %config.level, json = config.json, "tracing initialised");
    }
    installed
}

/// Log the outcome of an operation with structured fields.
///
/// # Parameters
/// * `operation` - Logical operation identifier (e.g. `"gateway::verify_account"`).
/// * `elapsed` - Duration the operation took.
/// * `error` - The failure, if the operation did not succeed.
///
/// Callers must avoid forwarding sensitive values in `operation`.
#[inline]
pub fn log_operation_outcome(operation: &str, elapsed: Duration, error: Option<&TollgateError>) {
    let duration_ms = elapsed.as_millis() as u64;

    match error {
        None => info!(operation, duration_ms, "operation_success"),
        Some(err) => warn!(
            operation,
            duration_ms,
            error_type = error_label(err),
            failure_kind = failure_label(err.failure_kind()),
            error = %err,
            "operation_failure"
        ),
    }
}

/// Convert a `TollgateError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &TollgateError) -> &'static str {
    match error {
        TollgateError::Connection(_) => "connection",
        TollgateError::Timeout(_) => "timeout",
        TollgateError::Auth(_) => "auth",
        TollgateError::RateLimited { .. } => "rate_limited",
        TollgateError::CapacityExceeded(_) => "capacity_exceeded",
        TollgateError::Database(_) => "database",
        TollgateError::Config(_) => "config",
        TollgateError::NotFound(_) => "not_found",
        TollgateError::InvalidInput(_) => "invalid_input",
        TollgateError::Internal(_) => "internal",
    }
}

#[inline]
pub fn failure_label(kind: FailureKind) -> &'static str {
    kind.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(error_label(&TollgateError::Connection("x".into())), "connection");
        assert_eq!(error_label(&TollgateError::rate_limited("slow down", Some(5))), "rate_limited");
        assert_eq!(error_label(&TollgateError::CapacityExceeded("full".into())), "capacity_exceeded");
        assert_eq!(failure_label(FailureKind::AuthFailure), "auth_failure");
    }

    #[test]
    fn init_is_idempotent() {
        let config = LoggingConfig::default();
        // only the first call in the process can install a subscriber
        let _ = init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
