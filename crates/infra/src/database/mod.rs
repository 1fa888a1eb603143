//! PostgreSQL adapter for the game store ports
//!
//! [`PgConnector`] opens one `tokio-postgres` connection per `connect()` and
//! drives it on a spawned task; [`PgGameStore`] implements every `GameStore`
//! query on that connection. Reconnection, retries and degraded defaults are
//! the concern of `tollgate-core::persistence`, not of this module.

pub mod pg_connector;
pub mod pg_store;

pub use pg_connector::PgConnector;
pub use pg_store::{PgGameStore, SCHEMA_VERSION};
