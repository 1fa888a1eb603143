//! Conversions from external infrastructure errors into domain errors.
//!
//! Every mapping here works from structured signals (status codes, SQLSTATE
//! classes, driver error kinds). Nothing inspects message text.

use reqwest::{Error as HttpError, StatusCode};
use tokio_postgres::error::SqlState;
use tokio_postgres::Error as PgError;
use tollgate_domain::TollgateError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub TollgateError);

impl From<InfraError> for TollgateError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<TollgateError> for InfraError {
    fn from(value: TollgateError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoTollgateError {
    fn into_tollgate(self) -> TollgateError;
}

/* -------------------------------------------------------------------------- */
/* HTTP status → TollgateError */
/* -------------------------------------------------------------------------- */

/// Map a non-success HTTP status onto the domain taxonomy
///
/// `retry_after_secs` is only meaningful for 429 responses.
pub fn error_from_status(
    status: StatusCode,
    retry_after_secs: Option<u64>,
    detail: &str,
) -> TollgateError {
    let code = status.as_u16();
    let mut message =
        format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
    if !detail.is_empty() {
        message.push_str(": ");
        message.push_str(detail);
    }

    match code {
        401 | 403 => TollgateError::Auth(message),
        404 => TollgateError::NotFound(message),
        408 => TollgateError::Timeout(message),
        429 => TollgateError::RateLimited { message, retry_after_secs },
        400..=499 => TollgateError::InvalidInput(message),
        500..=599 => TollgateError::Connection(message),
        _ => TollgateError::Internal(message),
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TollgateError */
/* -------------------------------------------------------------------------- */

impl IntoTollgateError for HttpError {
    fn into_tollgate(self) -> TollgateError {
        if self.is_timeout() {
            return TollgateError::Timeout("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return TollgateError::Connection("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            return error_from_status(status, None, "");
        }

        if self.is_builder() {
            return TollgateError::Config(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() || self.is_body() {
            return TollgateError::Internal(format!("malformed HTTP response: {self}"));
        }

        TollgateError::Connection(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_tollgate())
    }
}

/* -------------------------------------------------------------------------- */
/* tokio_postgres::Error → TollgateError */
/* -------------------------------------------------------------------------- */

impl IntoTollgateError for PgError {
    fn into_tollgate(self) -> TollgateError {
        if self.is_closed() {
            return TollgateError::Connection("database connection closed".into());
        }

        let Some(state) = self.code() else {
            // no SQLSTATE: io, tls or protocol failure below the query layer
            return TollgateError::Connection(format!("database transport failure: {self}"));
        };

        classify_sql_state(state, &self.to_string())
    }
}

/// Map a SQLSTATE onto the domain taxonomy
pub(crate) fn classify_sql_state(state: &SqlState, message: &str) -> TollgateError {
    let code = state.code();

    if *state == SqlState::INVALID_PASSWORD
        || *state == SqlState::INVALID_AUTHORIZATION_SPECIFICATION
        || *state == SqlState::INSUFFICIENT_PRIVILEGE
    {
        return TollgateError::Auth(format!("database rejected credentials ({code})"));
    }

    if *state == SqlState::QUERY_CANCELED {
        return TollgateError::Timeout(format!("database statement cancelled ({code})"));
    }

    if *state == SqlState::TOO_MANY_CONNECTIONS {
        return TollgateError::CapacityExceeded(format!("database refused connection ({code})"));
    }

    // class 08: connection exception; class 57: operator intervention
    if code.starts_with("08")
        || *state == SqlState::ADMIN_SHUTDOWN
        || *state == SqlState::CRASH_SHUTDOWN
        || *state == SqlState::CANNOT_CONNECT_NOW
    {
        return TollgateError::Connection(format!("database unavailable ({code})"));
    }

    TollgateError::Database(format!("{message} ({code})"))
}

impl From<PgError> for InfraError {
    fn from(value: PgError) -> Self {
        InfraError(value.into_tollgate())
    }
}

/* -------------------------------------------------------------------------- */
/* native_tls::Error → TollgateError */
/* -------------------------------------------------------------------------- */

impl IntoTollgateError for native_tls::Error {
    fn into_tollgate(self) -> TollgateError {
        TollgateError::Config(format!("TLS setup failed: {self}"))
    }
}

impl From<native_tls::Error> for InfraError {
    fn from(value: native_tls::Error) -> Self {
        InfraError(value.into_tollgate())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
