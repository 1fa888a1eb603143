//! Resilience building blocks for quota-bound and failure-prone dependencies
//!
//! This module provides **generic, reusable** primitives:
//! - **Clock**: time abstraction so window and cache logic can be tested
//!   deterministically (`MockClock`) or against tokio's virtual time
//!   (`TokioClock`)
//! - **BackoffPolicy**: capped exponential backoff with proportional jitter
//! - **WindowTracker**: fixed-window quota accounting keyed by endpoint
//! - **ReentrancyGuard**: compare-and-swap guard that lets exactly one caller
//!   run a critical sequence (for example a reconnection) at a time
//!
//! None of these types know what they protect; the gateway and persistence
//! layers in `tollgate-core` assemble them.

pub mod backoff;
pub mod clock;
pub mod guard;
pub mod window;

pub use backoff::BackoffPolicy;
pub use clock::{Clock, MockClock, SystemClock, TokioClock};
pub use guard::{ReentrancyGuard, ReentrancyPermit};
pub use window::{RateLimitWindow, WindowQuota, WindowTracker};
