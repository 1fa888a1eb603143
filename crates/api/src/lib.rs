//! # Tollgate App
//!
//! Composition root and service entry point.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Health reporting across the gateway and the database layer
//! - Logging initialisation and the `tollgate` binary
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
