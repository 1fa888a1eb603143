//! Port interfaces
//!
//! These traits define the boundaries between the resilience layer and the
//! infrastructure adapters.

pub mod social;
pub mod storage;

pub use social::SocialApiClient;
pub use storage::{GameConnector, GameStore};
