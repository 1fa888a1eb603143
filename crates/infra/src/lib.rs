//! # Tollgate Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Postgres game store and connection factory (`tokio-postgres`)
//! - HTTP client and the social API integration (`reqwest`)
//! - Configuration loading from environment and files
//! - Mapping of driver errors onto the domain error model
//!
//! ## Architecture
//! - Implements traits defined in `tollgate-core`
//! - Depends on `tollgate-domain` and `tollgate-core`
//! - Contains all "impure" code (network and database I/O)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;

// Re-export commonly used items
pub use database::{PgConnector, PgGameStore, SCHEMA_VERSION};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::SocialHttpClient;
