//! Resilient access to the game database
//!
//! [`ConnectionSupervisor`] owns the connection handle and its health,
//! [`RetryExecutor`] wraps each operation with reconnect, retry and backoff,
//! and [`DegradedModeProvider`] supplies a well-typed default once retries
//! run out. [`ResilientStore`] is the facade game logic calls.

pub mod degraded;
pub mod executor;
pub mod facade;
pub mod supervisor;

pub use degraded::{Degradable, DegradedCategory, DegradedModeProvider};
pub use executor::{RetryContext, RetryExecutor, RetryOutcome};
pub use facade::ResilientStore;
pub use supervisor::{ConnectionSupervisor, ReconnectOutcome, SupervisorConfig};
