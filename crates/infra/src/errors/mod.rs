//! Infrastructure error conversions

pub mod conversions;

pub use conversions::{error_from_status, InfraError};
