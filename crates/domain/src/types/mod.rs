//! Domain types and models

pub mod connection;
pub mod game;
pub mod rate_limit;
pub mod social;

pub use connection::{ConnectionReport, ConnectionStatus, DegradedCounts, HealthState};
pub use game::{GangRecord, InventoryItem, LeaderboardEntry, PrisonRecord};
pub use rate_limit::{EndpointRateStatus, RateLimitStatus};
pub use social::{Endpoint, Post, SocialAccount};
