//! Health reporting commands

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::context::AppContext;
use crate::utils::health::HealthStatus;

/// Get application health status
///
/// # Example Response
/// ```json
/// {
///   "is_healthy": true,
///   "score": 1.0,
///   "failing": [],
///   "components": [
///     { "component": "social_api", "is_healthy": true, "detail": "ok (@tollgate_bot)", "checked_at": "2024-05-01T12:00:00Z" },
///     { "component": "database", "is_healthy": true, "detail": null, "checked_at": "2024-05-01T12:00:00Z" },
///     { "component": "request_queue", "is_healthy": true, "detail": null, "checked_at": "2024-05-01T12:00:00Z" }
///   ],
///   "generated_at": "2024-05-01T12:00:00Z"
/// }
/// ```
pub async fn get_app_health(context: &AppContext) -> HealthStatus {
    context.health_check().await
}

/// Snapshot of the rate-limit and connection telemetry as JSON
pub fn get_resilience_report(context: &AppContext) -> serde_json::Value {
    serde_json::json!({
        "rate_limits": context.gateway.get_rate_limit_status(),
        "database": context.store.get_connection_status(),
    })
}

/// Log one health report with structured fields
pub async fn log_health_report(context: &AppContext) -> HealthStatus {
    let status = get_app_health(context).await;
    let report = get_resilience_report(context);

    if status.is_healthy {
        info!(score = status.score, report = %report, "health_report");
    } else {
        warn!(
            score = status.score,
            summary = status.summary().unwrap_or_default(),
            report = %report,
            "health_report"
        );
    }
    status
}

/// Log a health report every `interval` until `shutdown` resolves
///
/// Returns the number of reports written.
pub async fn run_health_reporter<F>(context: &AppContext, interval: Duration, shutdown: F) -> u64
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut reports = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                log_health_report(context).await;
                reports += 1;
            }
        }
    }
    reports
}
