//! Health report over the three things Tollgate depends on
//!
//! Each check yields a [`ComponentHealth`]; [`HealthStatus::from_checks`]
//! reduces them to a score, healthy at or above [`HEALTHY_SCORE_THRESHOLD`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tollgate_domain::constants::HEALTHY_SCORE_THRESHOLD;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    /// Upstream social API, reached through the gateway
    SocialApi,
    Database,
    /// Gateway request queue occupancy
    RequestQueue,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SocialApi => "social_api",
            Self::Database => "database",
            Self::RequestQueue => "request_queue",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub component: Component,
    pub is_healthy: bool,
    pub detail: Option<String>,
    /// When the check actually ran; earlier than the report for a carried-over result
    pub checked_at: DateTime<Utc>,
}

impl ComponentHealth {
    pub fn healthy(component: Component) -> Self {
        Self { component, is_healthy: true, detail: None, checked_at: Utc::now() }
    }

    pub fn unhealthy(component: Component, detail: impl Into<String>) -> Self {
        Self { component, is_healthy: false, detail: Some(detail.into()), checked_at: Utc::now() }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Repeat an earlier result with a note on why it was not re-checked
    ///
    /// Verdict and `checked_at` are kept as they were.
    pub fn carried_over(&self, note: &str) -> Self {
        let detail = match &self.detail {
            Some(detail) => format!("{detail}; {note}"),
            None => note.to_string(),
        };
        Self { detail: Some(detail), ..self.clone() }
    }
}

/// Scored application health
///
/// ```no_run
/// use tollgate_lib::utils::health::{Component, ComponentHealth, HealthStatus};
///
/// let status = HealthStatus::from_checks(vec![
///     ComponentHealth::healthy(Component::Database),
///     ComponentHealth::unhealthy(Component::SocialApi, "auth rejected"),
/// ]);
///
/// assert_eq!(status.score, 0.5);
/// assert!(!status.is_healthy);
/// assert_eq!(status.summary().as_deref(), Some("unhealthy: social_api"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub is_healthy: bool,
    /// Share of healthy components, 0.0 to 1.0
    pub score: f64,
    pub failing: Vec<Component>,
    pub components: Vec<ComponentHealth>,
    pub generated_at: DateTime<Utc>,
}

impl HealthStatus {
    /// An empty report counts as fully healthy
    pub fn from_checks(components: Vec<ComponentHealth>) -> Self {
        let failing: Vec<Component> =
            components.iter().filter(|c| !c.is_healthy).map(|c| c.component).collect();

        let score = if components.is_empty() {
            1.0
        } else {
            (components.len() - failing.len()) as f64 / components.len() as f64
        };

        Self {
            is_healthy: score >= HEALTHY_SCORE_THRESHOLD,
            score,
            failing,
            components,
            generated_at: Utc::now(),
        }
    }

    pub fn component(&self, component: Component) -> Option<&ComponentHealth> {
        self.components.iter().find(|c| c.component == component)
    }

    /// `"unhealthy: a, b"`, or `None` when every component passed
    pub fn summary(&self) -> Option<String> {
        if self.failing.is_empty() {
            return None;
        }
        let names: Vec<&str> = self.failing.iter().map(Component::as_str).collect();
        Some(format!("unhealthy: {}", names.join(", ")))
    }
}
