//! Capped exponential backoff with proportional jitter
//!
//! `delay(attempt) = min(base * 2^attempt * (1 + j), max_delay)` where `j` is
//! drawn uniformly from `[jitter_min, jitter_max]` (10%-30% by default).
//! Attempts are zero-indexed. Because consecutive unjittered delays double
//! while the jitter band is narrower than that, the jittered delay is
//! non-decreasing in `attempt`, and the final clamp keeps it at or below
//! `max_delay`.

use std::time::Duration;

use rand::Rng;

use crate::error::{CommonError, CommonResult};

/// Default base delay for exponential backoff
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default maximum delay cap
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Default lower bound of the jitter factor
pub const DEFAULT_JITTER_MIN: f64 = 0.1;

/// Default upper bound of the jitter factor
pub const DEFAULT_JITTER_MAX: f64 = 0.3;

/// Maximum exponent for exponential backoff calculation to prevent overflow
const MAX_BACKOFF_EXPONENT: u32 = 30;

/// Exponential backoff policy shared by reconnection and retry loops
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    base_delay: Duration,
    max_delay: Duration,
    jitter_min: f64,
    jitter_max: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            jitter_min: DEFAULT_JITTER_MIN,
            jitter_max: DEFAULT_JITTER_MAX,
        }
    }
}

impl BackoffPolicy {
    /// Create a policy with the default 10%-30% jitter band
    pub fn new(base_delay: Duration, max_delay: Duration) -> CommonResult<Self> {
        if base_delay > max_delay {
            return Err(CommonError::config_field(
                "base_delay",
                format!("base_delay ({base_delay:?}) cannot be greater than max_delay ({max_delay:?})"),
            ));
        }

        Ok(Self { base_delay, max_delay, ..Self::default() })
    }

    /// Replace the jitter band; both bounds are fractions of the base delay
    pub fn with_jitter(mut self, jitter_min: f64, jitter_max: f64) -> CommonResult<Self> {
        if !(0.0..=1.0).contains(&jitter_min) || !(0.0..=1.0).contains(&jitter_max) {
            return Err(CommonError::config_field("jitter", "jitter bounds must lie in [0, 1]"));
        }
        if jitter_min > jitter_max {
            return Err(CommonError::config_field(
                "jitter",
                format!("jitter_min ({jitter_min}) cannot exceed jitter_max ({jitter_max})"),
            ));
        }
        self.jitter_min = jitter_min;
        self.jitter_max = jitter_max;
        Ok(self)
    }

    /// Disable jitter entirely (deterministic delays)
    pub fn without_jitter(mut self) -> Self {
        self.jitter_min = 0.0;
        self.jitter_max = 0.0;
        self
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Exponential delay without jitter: `min(base * 2^attempt, max_delay)`
    pub fn unjittered(&self, attempt: u32) -> Duration {
        let base_millis = self.base_delay.as_millis() as u64;
        let max_millis = self.max_delay.as_millis() as u64;

        let exponent = attempt.min(MAX_BACKOFF_EXPONENT);
        let multiplier = 2_u64.saturating_pow(exponent);

        Duration::from_millis(base_millis.saturating_mul(multiplier).min(max_millis))
    }

    /// Inclusive range that `delay(attempt)` is drawn from
    pub fn jitter_bounds(&self, attempt: u32) -> (Duration, Duration) {
        let base = self.unjittered(attempt);
        (self.scale(base, self.jitter_min), self.scale(base, self.jitter_max))
    }

    /// Jittered delay before retry number `attempt` (zero-indexed)
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.unjittered(attempt);
        if self.jitter_max == 0.0 {
            return base;
        }

        let factor = if self.jitter_min < self.jitter_max {
            rand::thread_rng().gen_range(self.jitter_min..=self.jitter_max)
        } else {
            self.jitter_min
        };

        self.scale(base, factor)
    }

    fn scale(&self, base: Duration, factor: f64) -> Duration {
        let millis = (base.as_millis() as f64 * (1.0 + factor)) as u64;
        Duration::from_millis(millis).min(self.max_delay)
    }
}
