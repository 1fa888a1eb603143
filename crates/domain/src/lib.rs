//! # Tollgate Domain
//!
//! Domain types and models for Tollgate.
//!
//! This crate contains:
//! - Domain data types (Endpoint, SocialAccount, ConnectionStatus, game records)
//! - The `TollgateError` hierarchy and its `FailureKind` classification
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Tollgate crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
