//! Fixed-window quota accounting
//!
//! A window opens at the first request after the previous window expired and
//! admits `requests_per_window` requests until `window` has elapsed since the
//! most recent recorded request. A server-reported quota exhaustion closes the
//! window until an explicit reopen instant. Keys the tracker was not
//! configured with are unconstrained.
//!
//! The tracker is plain `&mut self` state. It is owned by exactly one task
//! (the gateway worker), so there is no interior locking.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::error::{CommonError, CommonResult};
use crate::resilience::clock::{Clock, SystemClock};

/// Quota configuration for a single key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowQuota {
    pub requests_per_window: u32,
    pub window: Duration,
}

impl WindowQuota {
    pub fn new(requests_per_window: u32, window: Duration) -> CommonResult<Self> {
        if requests_per_window == 0 {
            return Err(CommonError::config_field(
                "requests_per_window",
                "requests_per_window must be greater than 0",
            ));
        }
        if window.is_zero() {
            return Err(CommonError::config_field("window", "window must be greater than 0"));
        }
        Ok(Self { requests_per_window, window })
    }
}

/// Quota window state for one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitWindow {
    quota: WindowQuota,
    last_request: Option<Instant>,
    reopens_at: Option<Instant>,
    request_count: u32,
}

impl RateLimitWindow {
    pub fn new(quota: WindowQuota) -> Self {
        Self { quota, last_request: None, reopens_at: None, request_count: 0 }
    }

    pub fn quota(&self) -> WindowQuota {
        self.quota
    }

    pub fn last_request(&self) -> Option<Instant> {
        self.last_request
    }

    /// True when no request was ever recorded or the window has fully elapsed
    pub fn is_expired(&self, now: Instant) -> bool {
        self.reopens_at.map_or(true, |reopen| now >= reopen)
    }

    pub fn can_proceed(&self, now: Instant) -> bool {
        self.is_expired(now) || self.request_count < self.quota.requests_per_window
    }

    /// Time until the next request is admitted; zero when one would be now
    pub fn time_until_available(&self, now: Instant) -> Duration {
        if self.can_proceed(now) {
            return Duration::ZERO;
        }
        self.reset_time().map_or(Duration::ZERO, |reset| reset.saturating_duration_since(now))
    }

    /// Requests counted against the current window
    pub fn requests_used(&self, now: Instant) -> u32 {
        if self.is_expired(now) {
            0
        } else {
            self.request_count
        }
    }

    /// Instant at which the current window expires, if one was ever opened
    pub fn reset_time(&self) -> Option<Instant> {
        self.reopens_at
    }

    /// Count a request made at `now`
    pub fn record(&mut self, now: Instant) {
        if self.is_expired(now) {
            self.request_count = 1;
        } else {
            self.request_count = self.request_count.saturating_add(1);
        }
        self.last_request = Some(now);
        self.reopens_at = Some(now.checked_add(self.quota.window).unwrap_or(now));
    }

    /// Mark the window exhausted after the server reported quota exhaustion
    ///
    /// The window stays closed until `retry_after` from `now`.
    pub fn saturate(&mut self, now: Instant, retry_after: Duration) {
        self.request_count = self.quota.requests_per_window;
        self.reopens_at = Some(now.checked_add(retry_after).unwrap_or(now));
    }
}

/// Per-key fixed-window tracker
#[derive(Debug)]
pub struct WindowTracker<K, C: Clock = SystemClock> {
    windows: HashMap<K, RateLimitWindow>,
    clock: C,
}

impl<K: Eq + Hash + Clone> WindowTracker<K, SystemClock> {
    pub fn new(quotas: impl IntoIterator<Item = (K, WindowQuota)>) -> Self {
        Self::with_clock(quotas, SystemClock)
    }
}

impl<K: Eq + Hash + Clone, C: Clock> WindowTracker<K, C> {
    pub fn with_clock(quotas: impl IntoIterator<Item = (K, WindowQuota)>, clock: C) -> Self {
        let windows =
            quotas.into_iter().map(|(key, quota)| (key, RateLimitWindow::new(quota))).collect();
        Self { windows, clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn can_proceed(&self, key: &K) -> bool {
        let now = self.clock.now();
        self.windows.get(key).map_or(true, |window| window.can_proceed(now))
    }

    /// Record a request; no-op for unconfigured keys
    pub fn record_request(&mut self, key: &K) {
        let now = self.clock.now();
        if let Some(window) = self.windows.get_mut(key) {
            window.record(now);
        }
    }

    pub fn time_until_available(&self, key: &K) -> Duration {
        let now = self.clock.now();
        self.windows.get(key).map_or(Duration::ZERO, |window| window.time_until_available(now))
    }

    pub fn saturate(&mut self, key: &K, retry_after: Duration) {
        let now = self.clock.now();
        if let Some(window) = self.windows.get_mut(key) {
            window.saturate(now, retry_after);
        }
    }

    pub fn requests_used(&self, key: &K) -> u32 {
        let now = self.clock.now();
        self.windows.get(key).map_or(0, |window| window.requests_used(now))
    }

    pub fn window(&self, key: &K) -> Option<&RateLimitWindow> {
        self.windows.get(key)
    }

    pub fn windows(&self) -> impl Iterator<Item = (&K, &RateLimitWindow)> {
        self.windows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::clock::MockClock;

    fn tracker(limit: u32, window_secs: u64) -> (WindowTracker<&'static str, MockClock>, MockClock) {
        let clock = MockClock::new();
        let quota = WindowQuota::new(limit, Duration::from_secs(window_secs)).unwrap();
        (WindowTracker::with_clock([("lookup", quota)], clock.clone()), clock)
    }

    #[test]
    fn single_request_window_blocks_until_expiry() {
        let (mut tracker, clock) = tracker(1, 900);

        assert!(tracker.can_proceed(&"lookup"));
        tracker.record_request(&"lookup");
        assert!(!tracker.can_proceed(&"lookup"));
        assert_eq!(tracker.time_until_available(&"lookup"), Duration::from_secs(900));

        clock.advance_secs(600);
        assert_eq!(tracker.time_until_available(&"lookup"), Duration::from_secs(300));

        clock.advance_secs(300);
        assert!(tracker.can_proceed(&"lookup"));
        assert_eq!(tracker.time_until_available(&"lookup"), Duration::ZERO);
        assert_eq!(tracker.requests_used(&"lookup"), 0);
    }

    #[test]
    fn count_resets_after_window_expires() {
        let (mut tracker, clock) = tracker(3, 60);

        tracker.record_request(&"lookup");
        tracker.record_request(&"lookup");
        assert_eq!(tracker.requests_used(&"lookup"), 2);
        assert!(tracker.can_proceed(&"lookup"));

        clock.advance_secs(61);
        tracker.record_request(&"lookup");
        assert_eq!(tracker.requests_used(&"lookup"), 1);
    }

    #[test]
    fn multi_request_window_admits_up_to_limit() {
        let (mut tracker, _clock) = tracker(3, 60);
        for _ in 0..3 {
            assert!(tracker.can_proceed(&"lookup"));
            tracker.record_request(&"lookup");
        }
        assert!(!tracker.can_proceed(&"lookup"));
    }

    #[test]
    fn unknown_keys_are_unconstrained() {
        let (mut tracker, _clock) = tracker(1, 900);

        tracker.record_request(&"posts");
        tracker.record_request(&"posts");

        assert!(tracker.can_proceed(&"posts"));
        assert_eq!(tracker.time_until_available(&"posts"), Duration::ZERO);
        assert!(tracker.window(&"posts").is_none());
    }

    #[test]
    fn saturate_blocks_for_retry_after() {
        let (mut tracker, clock) = tracker(5, 900);

        tracker.saturate(&"lookup", Duration::from_secs(120));
        assert!(!tracker.can_proceed(&"lookup"));
        assert_eq!(tracker.time_until_available(&"lookup"), Duration::from_secs(120));

        clock.advance_secs(120);
        assert!(tracker.can_proceed(&"lookup"));
    }

    #[test]
    fn saturate_longer_than_window() {
        let (mut tracker, clock) = tracker(1, 60);

        tracker.saturate(&"lookup", Duration::from_secs(300));
        assert_eq!(tracker.time_until_available(&"lookup"), Duration::from_secs(300));

        clock.advance_secs(299);
        assert!(!tracker.can_proceed(&"lookup"));
        clock.advance_secs(1);
        assert!(tracker.can_proceed(&"lookup"));
    }

    #[test]
    fn reset_time_follows_last_request() {
        let (mut tracker, _clock) = tracker(1, 900);
        assert!(tracker.window(&"lookup").and_then(|w| w.reset_time()).is_none());

        tracker.record_request(&"lookup");
        let window = tracker.window(&"lookup").unwrap();
        let last = window.last_request().unwrap();
        assert_eq!(window.reset_time(), Some(last + Duration::from_secs(900)));
    }

    #[test]
    fn quota_validation() {
        assert!(WindowQuota::new(0, Duration::from_secs(1)).is_err());
        assert!(WindowQuota::new(1, Duration::ZERO).is_err());
    }
}
