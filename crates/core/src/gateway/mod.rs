//! Quota-aware social gateway
//!
//! Every outbound call to the social API goes through one long-lived worker
//! task. The worker owns the per-endpoint [`WindowTracker`] and the response
//! [`TtlCache`] outright, so quota accounting is single-writer state without
//! locks. Callers talk to it through [`SocialGateway`], which bounds how long
//! they wait and turns every failure into a [`GatewayFailure`] value.
//!
//! ```text
//! caller -> SocialGateway -> RequestQueue (bounded mpsc) -> GatewayWorker
//!                                  ^                           |  cache hit: resolve
//!                                  |   delayed re-enqueue      |  window closed: defer
//!                                  +---------------------------+  otherwise: call API
//! ```
//!
//! [`WindowTracker`]: tollgate_common::resilience::WindowTracker
//! [`TtlCache`]: tollgate_common::cache::TtlCache

pub mod facade;
pub mod failure;
pub mod queue;
pub mod worker;

pub use facade::SocialGateway;
pub use failure::{GatewayFailure, GatewayOutcome};
pub use queue::{ApiPayload, Operation, QueuedRequest, RequestQueue};
pub use worker::{GatewaySnapshot, GatewayWorker};
