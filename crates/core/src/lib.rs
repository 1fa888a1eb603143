//! # Tollgate Core
//!
//! The resilience layer, free of infrastructure code.
//!
//! This crate contains:
//! - Port interfaces for the social API and the game database
//! - The quota-aware social gateway (request queue, worker, facade)
//! - The persistence resilience stack (supervisor, retry executor,
//!   degraded-mode provider, data-access facade)
//!
//! ## Architecture Principles
//! - Depends only on `tollgate-common` and `tollgate-domain`
//! - No HTTP or database drivers; adapters implement the ports in
//!   `tollgate-infra`
//! - Every public operation is async on the caller's runtime

pub mod gateway;
pub mod persistence;
pub mod ports;

pub use gateway::{ApiPayload, GatewayFailure, GatewayOutcome, SocialGateway};
pub use persistence::{
    ConnectionSupervisor, DegradedModeProvider, ReconnectOutcome, ResilientStore, RetryExecutor,
    RetryOutcome,
};
pub use ports::{GameConnector, GameStore, SocialApiClient};
